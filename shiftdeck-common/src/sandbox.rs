//! In-memory sandbox cluster
//!
//! A small REST responder that understands the console's endpoint layout.
//! The console runs against it when no API base URL is configured, and the
//! integration tests use it as their transport.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{ApiRequest, ApiResponse, Method, Transport};
use crate::manifest::{
    add_egress_ip, EgressIpNote, HostSubnetObject, NamespaceObject, NetworkPolicyObject, ObjectMeta,
    PolicySpec, RoleObject, RoleSpec, UserObject, LAST_LOGIN_ANNOTATION,
    RESOURCE_COUNT_ANNOTATION, STATUS_ANNOTATION,
};
use crate::model::{EgressType, PolicyType, Status};
use crate::paths;
use crate::Result;

/// A parsed resource path: `/api/v1/...` or `/apis/{group}/{version}/...`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Route {
    /// `{group/}version/resource`, e.g. `rbac.authorization.k8s.io/v1/roles`
    resource: String,
    namespace: Option<String>,
    name: Option<String>,
}

impl Route {
    fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (group_version, rest) = match segments.as_slice() {
            ["api", version, rest @ ..] => (version.to_string(), rest),
            ["apis", group, version, rest @ ..] => (format!("{}/{}", group, version), rest),
            _ => return None,
        };

        let (namespace, resource, name) = match rest {
            ["namespaces", ns, resource, name @ ..] => (Some(ns.to_string()), *resource, name),
            [resource, name @ ..] => (None, *resource, name),
            [] => return None,
        };

        let name = match name {
            [] => None,
            [name] => Some(name.to_string()),
            _ => return None,
        };

        Some(Route {
            resource: format!("{}/{}", group_version, resource),
            namespace,
            name,
        })
    }

    fn scope(&self) -> String {
        self.namespace.clone().unwrap_or_default()
    }
}

// (resource, namespace or "", name)
type ObjectKey = (String, String, String);

pub struct SandboxCluster {
    objects: RefCell<BTreeMap<ObjectKey, Value>>,
    received: Cell<usize>,
}

impl Default for SandboxCluster {
    fn default() -> Self {
        Self::new()
    }
}

fn status(code: u16, reason: &str, message: String) -> ApiResponse {
    let outcome = if code < 300 { "Success" } else { "Failure" };
    let body = json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": outcome,
        "message": message,
        "reason": reason,
        "code": code,
    });
    ApiResponse {
        status: code,
        body: body.to_string(),
    }
}

fn ok(code: u16, body: &Value) -> ApiResponse {
    ApiResponse {
        status: code,
        body: body.to_string(),
    }
}

impl SandboxCluster {
    /// Base URL the client uses in sandbox mode
    pub const BASE_URL: &'static str = "sandbox://local";

    /// The only bearer token the sandbox accepts
    pub const TOKEN: &'static str = "sandbox-token";

    /// An empty cluster
    pub fn new() -> Self {
        Self {
            objects: RefCell::new(BTreeMap::new()),
            received: Cell::new(0),
        }
    }

    /// A cluster holding the demo data set
    pub fn seeded() -> Self {
        let cluster = Self::new();

        let namespaces: [(&str, &[(&str, &str)], u32); 5] = [
            ("default", &[("environment", "production")], 12),
            ("kube-system", &[("k8s-app", "kubernetes")], 45),
            ("kube-public", &[], 3),
            ("my-project", &[("team", "devops")], 18),
            ("analytics", &[("department", "data")], 8),
        ];
        for (name, labels, resources) in namespaces {
            let labels = labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let mut namespace = NamespaceObject::new(name, "", &labels);
            namespace.metadata = namespace
                .metadata
                .with_annotation(RESOURCE_COUNT_ANNOTATION, &resources.to_string());
            cluster.seed(paths::NAMESPACES, &namespace);
        }

        let users: [(&str, &str, &[&str], Status, &str); 5] = [
            ("admin", "admin@example.com", &["cluster-admin"], Status::Active, "2 min ago"),
            ("developer1", "dev1@example.com", &["developer", "view"], Status::Active, "1 hour ago"),
            ("developer2", "dev2@example.com", &["developer"], Status::Active, "3 hours ago"),
            ("devops1", "devops@example.com", &["admin", "edit"], Status::Active, "30 min ago"),
            ("readonly1", "readonly@example.com", &["view"], Status::Inactive, "2 days ago"),
        ];
        for (username, email, groups, status, last_login) in users {
            let mut user = UserObject::new(username, email, "");
            user.groups = groups.iter().map(|g| g.to_string()).collect();
            user.metadata = user
                .metadata
                .with_annotation(STATUS_ANNOTATION, &status.to_string())
                .with_annotation(LAST_LOGIN_ANNOTATION, last_login);
            cluster.seed(paths::USERS, &user);
        }

        let roles = [
            ("cluster-admin", "*", "*", "Full access to all resources"),
            ("admin", "*", "*", "Full access to namespace resources"),
            ("developer", "pods,services,deployments", "get,list,watch,create,update", "Developer access"),
            ("view", "*", "get,list,watch", "Read-only access"),
            ("edit", "*", "get,list,watch,create,update,patch", "Edit access"),
        ];
        for (name, resources, verbs, description) in roles {
            let spec = RoleSpec {
                name: name.to_string(),
                resources: resources.to_string(),
                verbs: verbs.to_string(),
                description: description.to_string(),
            };
            cluster.seed(paths::CLUSTER_ROLES, &RoleObject::cluster(&spec));
        }

        let policies = [
            ("default-deny", "my-project", PolicyType::Deny, "all"),
            ("allow-same-namespace", "my-project", PolicyType::Allow, "all"),
            ("allow-database", "my-project", PolicyType::Allow, "app=database"),
            ("restrict-ingress", "analytics", PolicyType::Deny, "all"),
        ];
        for (name, namespace, policy_type, selector) in policies {
            let spec = PolicySpec {
                name: name.to_string(),
                policy_type,
                pod_selector: selector.to_string(),
            };
            cluster.seed(
                &paths::network_policies(namespace),
                &NetworkPolicyObject::new(namespace, &spec),
            );
        }

        let egress_ips = [
            ("10.0.1.100", "my-project", "worker-1", EgressType::Assigned, Status::Active),
            ("10.0.1.101", "analytics", "worker-2", EgressType::Assigned, Status::Active),
            ("10.0.1.102", "default", "worker-1", EgressType::Reserved, Status::Inactive),
        ];
        for (node, cidr) in [("worker-1", "10.128.0.0/23"), ("worker-2", "10.128.2.0/23")] {
            let subnet = HostSubnetObject {
                metadata: ObjectMeta::named(node),
                host: Some(node.to_string()),
                spec: Default::default(),
            };
            let Ok(mut value) = serde_json::to_value(&subnet) else {
                continue;
            };
            value["subnet"] = json!(cidr);

            for (ip, namespace, _, egress_type, status) in
                egress_ips.iter().filter(|entry| entry.2 == node)
            {
                let note = EgressIpNote {
                    namespace: namespace.to_string(),
                    egress_type: *egress_type,
                    status: *status,
                };
                add_egress_ip(&mut value, ip, &note);
            }
            cluster.seed(paths::HOST_SUBNETS, &value);
        }

        cluster
    }

    fn seed<M: serde::Serialize>(&self, endpoint: &str, manifest: &M) {
        if let (Some(route), Ok(body)) = (Route::parse(endpoint), serde_json::to_value(manifest)) {
            self.create(&route, body);
        }
    }

    /// Number of requests received through `handle`
    pub fn received(&self) -> usize {
        self.received.get()
    }

    /// Number of stored objects of one resource type
    pub fn count(&self, endpoint: &str) -> usize {
        let Some(route) = Route::parse(endpoint) else {
            return 0;
        };
        self.objects
            .borrow()
            .keys()
            .filter(|(resource, ns, _)| {
                resource == &route.resource
                    && route.namespace.as_ref().map_or(true, |want| want == ns)
            })
            .count()
    }

    /// Answer one request
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        self.received.set(self.received.get() + 1);

        let path = request
            .url
            .strip_prefix(Self::BASE_URL)
            .unwrap_or(&request.url);
        let path = path.split('?').next().unwrap_or(path);

        debug!(method = %request.method, path, "Sandbox request");

        if path == paths::HEALTHZ {
            return ApiResponse {
                status: 200,
                body: "ok".to_string(),
            };
        }

        let expected = format!("Bearer {}", Self::TOKEN);
        if request.header("Authorization") != Some(expected.as_str()) {
            return status(401, "Unauthorized", "Unauthorized".to_string());
        }

        let Some(route) = Route::parse(path) else {
            return status(404, "NotFound", format!("the server could not find {}", path));
        };

        let body = match &request.body {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(body) => Some(body),
                Err(e) => return status(400, "BadRequest", format!("invalid body: {}", e)),
            },
            None => None,
        };

        match (request.method, route.name.is_some(), body) {
            (Method::Get, false, _) => self.list(&route),
            (Method::Get, true, _) => self.get(&route),
            (Method::Post, false, Some(body)) => self.create(&route, body),
            (Method::Put, true, Some(body)) => self.replace(&route, body),
            (Method::Delete, true, _) => self.delete(&route),
            _ => status(
                405,
                "MethodNotAllowed",
                format!("{} is not supported on {}", request.method, path),
            ),
        }
    }

    fn key(route: &Route, name: &str) -> ObjectKey {
        (route.resource.clone(), route.scope(), name.to_string())
    }

    fn list(&self, route: &Route) -> ApiResponse {
        let objects = self.objects.borrow();
        let items: Vec<&Value> = objects
            .iter()
            .filter(|((resource, ns, _), _)| {
                resource == &route.resource
                    && route.namespace.as_ref().map_or(true, |want| want == ns)
            })
            .map(|(_, object)| object)
            .collect();

        ok(200, &json!({ "kind": "List", "apiVersion": "v1", "items": items }))
    }

    fn get(&self, route: &Route) -> ApiResponse {
        let name = route.name.as_deref().unwrap_or_default();
        match self.objects.borrow().get(&Self::key(route, name)) {
            Some(object) => ok(200, object),
            None => status(404, "NotFound", format!("{} \"{}\" not found", route.resource, name)),
        }
    }

    fn create(&self, route: &Route, mut body: Value) -> ApiResponse {
        let name = body["metadata"]["name"].as_str().unwrap_or_default().to_string();
        if name.is_empty() || !body.is_object() {
            return status(400, "BadRequest", "metadata.name is required".to_string());
        }

        let key = Self::key(route, &name);
        if self.objects.borrow().contains_key(&key) {
            return status(
                409,
                "AlreadyExists",
                format!("{} \"{}\" already exists", route.resource, name),
            );
        }

        if let Some(ns) = &route.namespace {
            body["metadata"]["namespace"] = json!(ns);
        }
        if route.resource == "v1/namespaces" {
            body["status"] = json!({ "phase": "Active" });
        }

        self.objects.borrow_mut().insert(key, body.clone());
        ok(201, &body)
    }

    fn replace(&self, route: &Route, body: Value) -> ApiResponse {
        let name = route.name.as_deref().unwrap_or_default();
        let mut objects = self.objects.borrow_mut();
        match objects.get_mut(&Self::key(route, name)) {
            Some(object) => {
                *object = body;
                ok(200, object)
            }
            None => status(404, "NotFound", format!("{} \"{}\" not found", route.resource, name)),
        }
    }

    fn delete(&self, route: &Route) -> ApiResponse {
        let name = route.name.as_deref().unwrap_or_default();
        match self.objects.borrow_mut().remove(&Self::key(route, name)) {
            Some(_) => status(200, "Deleted", format!("{} \"{}\" deleted", route.resource, name)),
            None => status(404, "NotFound", format!("{} \"{}\" not found", route.resource, name)),
        }
    }
}

#[async_trait(?Send)]
impl Transport for SandboxCluster {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        Ok(self.handle(&request))
    }
}
