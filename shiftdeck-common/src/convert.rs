//! Conversion of cluster list responses into console records

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::labels::parse_labels;
use crate::manifest::{
    EgressIpNote, HostSubnetObject, NamespaceObject, NetworkPolicyObject, ObjectList, RoleObject,
    UserObject, LAST_LOGIN_ANNOTATION, RESOURCE_COUNT_ANNOTATION, STATUS_ANNOTATION,
};
use crate::model::{
    EgressIp, Namespace, NamespacePhase, NetworkPolicy, PolicyType, Role, RoleKind, Status, User,
};
use crate::Result;

/// Shown for values the cluster does not report
pub const UNKNOWN: &str = "-";

/// Selector text for a policy that selects every pod
pub const ALL_PODS: &str = "all";

fn items<T: DeserializeOwned>(list: Value) -> Result<Vec<T>> {
    let list: ObjectList<T> = serde_json::from_value(list)?;
    Ok(list.items)
}

pub fn namespaces(list: Value) -> Result<Vec<Namespace>> {
    Ok(items::<NamespaceObject>(list)?
        .into_iter()
        .map(Namespace::from)
        .collect())
}

pub fn users(list: Value) -> Result<Vec<User>> {
    Ok(items::<UserObject>(list)?.into_iter().map(User::from).collect())
}

/// List items usually omit `kind`, so the scope comes from the endpoint
pub fn roles(list: Value, kind: RoleKind) -> Result<Vec<Role>> {
    Ok(items::<RoleObject>(list)?
        .into_iter()
        .map(|object| role(object, kind))
        .collect())
}

pub fn network_policies(list: Value) -> Result<Vec<NetworkPolicy>> {
    Ok(items::<NetworkPolicyObject>(list)?
        .into_iter()
        .map(NetworkPolicy::from)
        .collect())
}

/// Flatten every host subnet's egress IPs into one record per address.
/// Namespace, type and status come from the subnet's per-IP annotation.
pub fn egress_ips(list: Value) -> Result<Vec<EgressIp>> {
    Ok(items::<HostSubnetObject>(list)?
        .into_iter()
        .flat_map(|subnet| {
            let HostSubnetObject {
                metadata,
                host,
                spec,
            } = subnet;
            let node = host
                .filter(|host| !host.is_empty())
                .unwrap_or_else(|| metadata.name.clone());
            let annotations = metadata.annotations;

            spec.egress_ips.into_iter().map(move |ip| {
                let note = annotations
                    .get(&EgressIpNote::annotation_key(&ip))
                    .map(|text| EgressIpNote::decode(text))
                    .unwrap_or_default();

                EgressIp {
                    ip,
                    namespace: note.namespace,
                    node: node.clone(),
                    egress_type: note.egress_type,
                    status: note.status,
                }
            })
        })
        .collect())
}

impl From<NamespaceObject> for Namespace {
    fn from(object: NamespaceObject) -> Self {
        let status = match object.status.and_then(|s| s.phase).as_deref() {
            Some("Terminating") => NamespacePhase::Terminating,
            _ => NamespacePhase::Active,
        };
        let description = object.metadata.description();
        let resources = object
            .metadata
            .annotation(RESOURCE_COUNT_ANNOTATION)
            .and_then(|count| count.parse().ok())
            .unwrap_or(0);

        Namespace {
            name: object.metadata.name,
            status,
            labels: object.metadata.labels,
            description,
            resources,
        }
    }
}

impl From<UserObject> for User {
    fn from(object: UserObject) -> Self {
        let status = object
            .metadata
            .annotation(STATUS_ANNOTATION)
            .and_then(|status| status.parse().ok())
            .unwrap_or_default();
        let last_login = object
            .metadata
            .annotation(LAST_LOGIN_ANNOTATION)
            .unwrap_or(UNKNOWN)
            .to_string();

        User {
            username: object.metadata.name,
            email: object.full_name.unwrap_or_default(),
            roles: object.groups,
            status,
            last_login,
        }
    }
}

fn role(object: RoleObject, kind: RoleKind) -> Role {
    let mut resources: Vec<String> = Vec::new();
    let mut verbs: Vec<String> = Vec::new();

    for rule in object.rules {
        for resource in rule.resources {
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }
        for verb in rule.verbs {
            if !verbs.contains(&verb) {
                verbs.push(verb);
            }
        }
    }

    Role {
        description: object.metadata.description(),
        name: object.metadata.name,
        kind,
        resources: resources.join(","),
        verbs: verbs.join(","),
    }
}

impl From<NetworkPolicyObject> for NetworkPolicy {
    fn from(object: NetworkPolicyObject) -> Self {
        let policy_type = if object.spec.ingress.is_empty() && object.spec.egress.is_empty() {
            PolicyType::Deny
        } else {
            PolicyType::Allow
        };

        let labels = &object.spec.pod_selector.match_labels;
        let pod_selector = if labels.is_empty() {
            ALL_PODS.to_string()
        } else {
            labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(",")
        };

        NetworkPolicy {
            name: object.metadata.name,
            namespace: object.metadata.namespace.unwrap_or_default(),
            policy_type,
            pod_selector,
            status: Status::Active,
        }
    }
}

/// Selector text as entered in forms, normalized the way it reads back
pub fn normalize_selector(selector: &str) -> String {
    let labels = parse_labels(selector);
    if labels.is_empty() {
        return ALL_PODS.to_string();
    }
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
