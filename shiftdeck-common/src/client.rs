//! Cluster API client
//!
//! Wraps the platform's REST API with bearer-token auth. The client is
//! generic over how bytes move (`Transport`) and where the token lives
//! (`TokenStore`), so the browser, the sandbox and tests share one code path.
//!
//! Public calls never return errors. Every failure is logged and collapsed
//! to `None` / `false`; a 401 additionally expires the session.

use std::cell::RefCell;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::convert;
use crate::manifest::{
    add_egress_ip, remove_egress_ip, EgressIpNote, NamespaceObject, NetworkPolicyObject,
    PolicySpec, RoleObject, RoleSpec, UserObject, LAST_LOGIN_ANNOTATION,
};
use crate::model::{Entity, ResourceKind, RoleKind, Status};
use crate::paths;
use crate::store::{CreateRequest, Loaded, JUST_NOW};
use crate::view::Toast;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A fully built HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to a cluster. Only transport failures are errors;
/// HTTP error statuses come back as responses.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Durable key-value storage for the token and last-used namespace
pub trait TokenStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

type Notifier = Box<dyn Fn(Toast)>;

pub struct ClusterClient<T, S> {
    base_url: String,
    token_key: String,
    namespace_key: String,
    transport: T,
    storage: S,
    token: RefCell<Option<String>>,
    namespace: RefCell<String>,
    notifier: Option<Notifier>,
}

impl<T: Transport, S: TokenStore> ClusterClient<T, S> {
    /// Build a client, restoring the persisted token and namespace
    pub fn new(config: &ConsoleConfig, transport: T, storage: S) -> Self {
        let token = storage
            .load(&config.token_key)
            .filter(|token| !token.is_empty());
        let namespace = storage
            .load(&config.namespace_key)
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| config.default_namespace.clone());

        debug!(
            base_url = %config.base_url(),
            restored_token = token.is_some(),
            namespace = %namespace,
            "API client created"
        );

        Self {
            base_url: config.base_url(),
            token_key: config.token_key.clone(),
            namespace_key: config.namespace_key.clone(),
            transport,
            storage,
            token: RefCell::new(token),
            namespace: RefCell::new(namespace),
            notifier: None,
        }
    }

    /// Route user-visible notices (session expiry) to `notify`
    pub fn with_notifier(mut self, notify: impl Fn(Toast) + 'static) -> Self {
        self.notifier = Some(Box::new(notify));
        self
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.storage.save(&self.token_key, &token);
        *self.token.borrow_mut() = Some(token);
        info!("Bearer token set");
    }

    /// Sign out: forget the token in memory and in storage
    pub fn clear_token(&self) {
        self.token.borrow_mut().take();
        self.storage.remove(&self.token_key);
        info!("Bearer token cleared");
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn set_namespace(&self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.storage.save(&self.namespace_key, &namespace);
        *self.namespace.borrow_mut() = namespace;
    }

    /// Last-used namespace; scopes namespaced roles
    pub fn namespace(&self) -> String {
        self.namespace.borrow().clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn expire_session(&self) {
        warn!("Received 401, session expired");
        self.clear_token();
        if let Some(notify) = &self.notifier {
            notify(Toast::error("Session expired. Please sign in again."));
        }
    }

    async fn send(&self, method: Method, endpoint: &str, body: Option<String>) -> Result<ApiResponse> {
        let token = self.token().ok_or(Error::NotAuthenticated)?;

        let request = ApiRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", token)),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body,
        };

        debug!(%method, endpoint, "API request");
        let response = self.transport.send(request).await?;
        debug!(%method, endpoint, status = response.status, "API response");

        match response.status {
            401 => {
                self.expire_session();
                Err(Error::SessionExpired)
            }
            404 => Err(Error::NotFound(endpoint.to_string())),
            _ if response.is_success() => Ok(response),
            status => Err(Error::Status {
                status,
                endpoint: endpoint.to_string(),
            }),
        }
    }

    async fn request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let body = body.map(serde_json::to_string).transpose()?;
        let response = self.send(method, endpoint, body).await?;

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    async fn post_manifest<M: Serialize>(&self, endpoint: &str, manifest: &M) -> Option<Value> {
        match serde_json::to_value(manifest) {
            Ok(body) => self.post(endpoint, &body).await,
            Err(e) => self.settle(Method::Post, endpoint, Err(e.into())),
        }
    }

    fn settle<R>(&self, method: Method, endpoint: &str, result: Result<R>) -> Option<R> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%method, endpoint, error = %e, "API call failed");
                None
            }
        }
    }

    pub async fn get(&self, endpoint: &str) -> Option<Value> {
        let result = self.request(Method::Get, endpoint, None).await;
        self.settle(Method::Get, endpoint, result)
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> Option<Value> {
        let result = self.request(Method::Post, endpoint, Some(body)).await;
        self.settle(Method::Post, endpoint, result)
    }

    pub async fn put(&self, endpoint: &str, body: &Value) -> Option<Value> {
        let result = self.request(Method::Put, endpoint, Some(body)).await;
        self.settle(Method::Put, endpoint, result)
    }

    pub async fn delete(&self, endpoint: &str) -> bool {
        let result = self.request(Method::Delete, endpoint, None).await;
        self.settle(Method::Delete, endpoint, result).is_some()
    }

    // Namespaces

    pub async fn get_namespaces(&self) -> Option<Value> {
        self.get(paths::NAMESPACES).await
    }

    pub async fn create_namespace(&self, name: &str, description: &str) -> Option<Value> {
        let manifest = NamespaceObject::new(name, description, &Default::default());
        self.post_manifest(paths::NAMESPACES, &manifest).await
    }

    pub async fn delete_namespace(&self, name: &str) -> bool {
        self.delete(&paths::namespace(name)).await
    }

    // Users

    pub async fn get_users(&self) -> Option<Value> {
        self.get(paths::USERS).await
    }

    pub async fn create_user(&self, username: &str, email: &str, role: &str) -> Option<Value> {
        let mut user = UserObject::new(username, email, role);
        user.metadata = user.metadata.with_annotation(LAST_LOGIN_ANNOTATION, JUST_NOW);
        self.post_manifest(paths::USERS, &user).await
    }

    pub async fn delete_user(&self, username: &str) -> bool {
        self.delete(&paths::user(username)).await
    }

    // Roles

    /// Roles of `namespace`, or cluster roles when `None`
    pub async fn get_roles(&self, namespace: Option<&str>) -> Option<Value> {
        match namespace {
            Some(ns) => self.get(&paths::roles(ns)).await,
            None => self.get(paths::CLUSTER_ROLES).await,
        }
    }

    pub async fn create_role(&self, namespace: &str, spec: &RoleSpec) -> Option<Value> {
        self.post_manifest(&paths::roles(namespace), &RoleObject::namespaced(namespace, spec))
            .await
    }

    pub async fn delete_role(&self, namespace: &str, name: &str) -> bool {
        self.delete(&paths::role(namespace, name)).await
    }

    pub async fn create_cluster_role(&self, spec: &RoleSpec) -> Option<Value> {
        self.post_manifest(paths::CLUSTER_ROLES, &RoleObject::cluster(spec))
            .await
    }

    pub async fn delete_cluster_role(&self, name: &str) -> bool {
        self.delete(&paths::cluster_role(name)).await
    }

    // Network policies

    /// Policies of `namespace`, or across all namespaces when `None`
    pub async fn get_network_policies(&self, namespace: Option<&str>) -> Option<Value> {
        match namespace {
            Some(ns) => self.get(&paths::network_policies(ns)).await,
            None => self.get(paths::NETWORK_POLICIES).await,
        }
    }

    pub async fn create_network_policy(&self, namespace: &str, spec: &PolicySpec) -> Option<Value> {
        let manifest = NetworkPolicyObject::new(namespace, spec);
        self.post_manifest(&paths::network_policies(namespace), &manifest)
            .await
    }

    pub async fn delete_network_policy(&self, namespace: &str, name: &str) -> bool {
        self.delete(&paths::network_policy(namespace, name)).await
    }

    // Egress IPs

    /// Host subnets, which carry the egress IP assignments
    pub async fn get_egress_ips(&self) -> Option<Value> {
        self.get(paths::HOST_SUBNETS).await
    }

    /// Add `ip` to `node`'s host subnet along with its note. `None` when the
    /// subnet is missing or the IP is already assigned.
    pub async fn assign_egress_ip(&self, ip: &str, node: &str, note: &EgressIpNote) -> Option<Value> {
        let endpoint = paths::host_subnet(node);
        let mut subnet = self.get(&endpoint).await?;

        if !add_egress_ip(&mut subnet, ip, note) {
            debug!(ip, node, "Egress IP already assigned");
            return None;
        }
        self.put(&endpoint, &subnet).await
    }

    /// Remove `ip` from `node`'s host subnet. `None` when the subnet is
    /// missing or does not list the IP.
    pub async fn release_egress_ip(&self, ip: &str, node: &str) -> Option<Value> {
        let endpoint = paths::host_subnet(node);
        let mut subnet = self.get(&endpoint).await?;

        if !remove_egress_ip(&mut subnet, ip) {
            debug!(ip, node, "Egress IP not assigned to node");
            return None;
        }
        self.put(&endpoint, &subnet).await
    }

    pub async fn delete_egress_ip(&self, name: &str, namespace: &str) -> bool {
        self.delete(&paths::egress_ip(namespace, name)).await
    }

    /// Liveness check; any failure reads as unhealthy
    pub async fn health_check(&self) -> bool {
        match self.send(Method::Get, paths::HEALTHZ, None).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    // Typed loading and dispatch used by the console

    async fn try_load(&self, kind: ResourceKind) -> Result<Loaded> {
        let loaded = match kind {
            ResourceKind::Namespaces => Loaded::Namespaces(convert::namespaces(
                self.request(Method::Get, paths::NAMESPACES, None).await?,
            )?),
            ResourceKind::Users => Loaded::Users(convert::users(
                self.request(Method::Get, paths::USERS, None).await?,
            )?),
            ResourceKind::Roles => {
                let cluster = self.request(Method::Get, paths::CLUSTER_ROLES, None).await?;
                let local = self
                    .request(Method::Get, &paths::roles(&self.namespace()), None)
                    .await?;

                let mut roles = convert::roles(cluster, RoleKind::ClusterRole)?;
                roles.extend(convert::roles(local, RoleKind::Role)?);
                Loaded::Roles(roles)
            }
            ResourceKind::NetworkPolicies => Loaded::NetworkPolicies(convert::network_policies(
                self.request(Method::Get, paths::NETWORK_POLICIES, None).await?,
            )?),
            ResourceKind::EgressIps => Loaded::EgressIps(convert::egress_ips(
                self.request(Method::Get, paths::HOST_SUBNETS, None).await?,
            )?),
        };
        Ok(loaded)
    }

    /// Fetch one collection as entity records
    pub async fn load(&self, kind: ResourceKind) -> Option<Loaded> {
        match self.try_load(kind).await {
            Ok(loaded) => Some(loaded),
            Err(e) => {
                warn!(%kind, error = %e, "Loading failed");
                None
            }
        }
    }

    /// Send a validated create form to the cluster
    pub async fn create_entity(&self, request: &CreateRequest) -> bool {
        match request {
            CreateRequest::Namespace { name, description } => {
                self.create_namespace(name, description).await.is_some()
            }
            CreateRequest::User {
                username,
                email,
                role,
            } => self.create_user(username, email, role).await.is_some(),
            CreateRequest::Role {
                name,
                kind,
                resources,
                verbs,
                description,
            } => {
                let spec = RoleSpec {
                    name: name.clone(),
                    resources: resources.clone(),
                    verbs: verbs.clone(),
                    description: description.clone(),
                };
                match kind {
                    RoleKind::ClusterRole => self.create_cluster_role(&spec).await.is_some(),
                    RoleKind::Role => self.create_role(&self.namespace(), &spec).await.is_some(),
                }
            }
            CreateRequest::NetworkPolicy {
                name,
                namespace,
                policy_type,
                pod_selector,
            } => {
                let spec = PolicySpec {
                    name: name.clone(),
                    policy_type: *policy_type,
                    pod_selector: pod_selector.clone(),
                };
                self.create_network_policy(namespace, &spec).await.is_some()
            }
            CreateRequest::EgressIp {
                ip,
                namespace,
                node,
                egress_type,
            } => {
                let note = EgressIpNote {
                    namespace: namespace.clone(),
                    egress_type: *egress_type,
                    status: Status::Active,
                };
                self.assign_egress_ip(ip, node, &note).await.is_some()
            }
        }
    }

    /// Delete the cluster object behind a mirrored record
    pub async fn delete_entity(&self, entity: &Entity) -> bool {
        match entity {
            Entity::Namespace(ns) => self.delete_namespace(&ns.name).await,
            Entity::User(user) => self.delete_user(&user.username).await,
            Entity::Role(role) => match role.kind {
                RoleKind::ClusterRole => self.delete_cluster_role(&role.name).await,
                RoleKind::Role => self.delete_role(&self.namespace(), &role.name).await,
            },
            Entity::NetworkPolicy(policy) => {
                self.delete_network_policy(&policy.namespace, &policy.name)
                    .await
            }
            Entity::EgressIp(eip) => self.release_egress_ip(&eip.ip, &eip.node).await.is_some(),
        }
    }
}
