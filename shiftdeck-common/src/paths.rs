//! REST endpoint paths consumed by the console

pub const HEALTHZ: &str = "/healthz";

pub const NAMESPACES: &str = "/api/v1/namespaces";
pub const USERS: &str = "/apis/user.openshift.io/v1/users";
pub const CLUSTER_ROLES: &str = "/apis/rbac.authorization.k8s.io/v1/clusterroles";
pub const NETWORK_POLICIES: &str = "/apis/networking.k8s.io/v1/networkpolicies";
pub const HOST_SUBNETS: &str = "/apis/network.openshift.io/v1/hostsubnets";

const RBAC: &str = "/apis/rbac.authorization.k8s.io/v1";
const NETWORKING: &str = "/apis/networking.k8s.io/v1";
const OPENSHIFT_NETWORK: &str = "/apis/network.openshift.io/v1";

pub fn namespace(name: &str) -> String {
    format!("{}/{}", NAMESPACES, name)
}

pub fn user(username: &str) -> String {
    format!("{}/{}", USERS, username)
}

pub fn cluster_role(name: &str) -> String {
    format!("{}/{}", CLUSTER_ROLES, name)
}

pub fn roles(namespace: &str) -> String {
    format!("{}/namespaces/{}/roles", RBAC, namespace)
}

pub fn role(namespace: &str, name: &str) -> String {
    format!("{}/{}", roles(namespace), name)
}

pub fn network_policies(namespace: &str) -> String {
    format!("{}/namespaces/{}/networkpolicies", NETWORKING, namespace)
}

pub fn network_policy(namespace: &str, name: &str) -> String {
    format!("{}/{}", network_policies(namespace), name)
}

pub fn host_subnet(node: &str) -> String {
    format!("{}/{}", HOST_SUBNETS, node)
}

pub fn egress_ip(namespace: &str, name: &str) -> String {
    format!("{}/namespaces/{}/egressips/{}", OPENSHIFT_NETWORK, namespace, name)
}
