//! In-memory mirror of the cluster's entities
//!
//! The store is owned by the console component and only changes after the
//! API client confirms a create or delete, or when a list is reloaded.

use std::collections::{BTreeMap, HashMap};

use crate::convert::{normalize_selector, UNKNOWN};
use crate::labels::format_labels;
use crate::model::{
    EgressIp, EgressType, Entity, EntityKey, Namespace, NamespacePhase, NetworkPolicy, PolicyType,
    ResourceKind, Role, RoleKind, Status, User,
};

/// Last-login text for a freshly created user
pub const JUST_NOW: &str = "Just now";

/// A validated create form, ready to be sent to the cluster and mirrored
#[derive(Debug, Clone, PartialEq)]
pub enum CreateRequest {
    Namespace {
        name: String,
        description: String,
    },
    User {
        username: String,
        email: String,
        role: String,
    },
    Role {
        name: String,
        kind: RoleKind,
        resources: String,
        verbs: String,
        description: String,
    },
    NetworkPolicy {
        name: String,
        namespace: String,
        policy_type: PolicyType,
        pod_selector: String,
    },
    EgressIp {
        ip: String,
        namespace: String,
        node: String,
        egress_type: EgressType,
    },
}

impl CreateRequest {
    pub fn key(&self) -> EntityKey {
        match self {
            CreateRequest::Namespace { name, .. } => EntityKey::Namespace(name.clone()),
            CreateRequest::User { username, .. } => EntityKey::User(username.clone()),
            CreateRequest::Role { name, kind, .. } => EntityKey::Role {
                kind: *kind,
                name: name.clone(),
            },
            CreateRequest::NetworkPolicy { name, namespace, .. } => EntityKey::NetworkPolicy {
                namespace: namespace.clone(),
                name: name.clone(),
            },
            CreateRequest::EgressIp { ip, .. } => EntityKey::EgressIp(ip.clone()),
        }
    }

    /// Record with default status fields, as mirrored after a successful create
    pub fn to_entity(&self) -> Entity {
        match self.clone() {
            CreateRequest::Namespace { name, description } => Entity::Namespace(Namespace {
                name,
                status: NamespacePhase::Active,
                labels: BTreeMap::new(),
                description,
                resources: 0,
            }),
            CreateRequest::User { username, email, role } => Entity::User(User {
                username,
                email,
                roles: vec![role],
                status: Status::Active,
                last_login: JUST_NOW.to_string(),
            }),
            CreateRequest::Role {
                name,
                kind,
                resources,
                verbs,
                description,
            } => Entity::Role(Role {
                name,
                kind,
                resources,
                verbs,
                description,
            }),
            CreateRequest::NetworkPolicy {
                name,
                namespace,
                policy_type,
                pod_selector,
            } => Entity::NetworkPolicy(NetworkPolicy {
                name,
                namespace,
                policy_type,
                pod_selector: normalize_selector(&pod_selector),
                status: Status::Active,
            }),
            CreateRequest::EgressIp {
                ip,
                namespace,
                node,
                egress_type,
            } => Entity::EgressIp(EgressIp {
                ip,
                namespace,
                node,
                egress_type,
                status: Status::Active,
            }),
        }
    }
}

/// A reloaded collection
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Namespaces(Vec<Namespace>),
    Users(Vec<User>),
    Roles(Vec<Role>),
    NetworkPolicies(Vec<NetworkPolicy>),
    EgressIps(Vec<EgressIp>),
}

impl Loaded {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Loaded::Namespaces(_) => ResourceKind::Namespaces,
            Loaded::Users(_) => ResourceKind::Users,
            Loaded::Roles(_) => ResourceKind::Roles,
            Loaded::NetworkPolicies(_) => ResourceKind::NetworkPolicies,
            Loaded::EgressIps(_) => ResourceKind::EgressIps,
        }
    }
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub namespaces: usize,
    pub users: usize,
    pub roles: usize,
    pub network_policies: usize,
    pub egress_ips: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleStore {
    pub namespaces: Vec<Namespace>,
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub network_policies: Vec<NetworkPolicy>,
    pub egress_ips: Vec<EgressIp>,
}

impl ConsoleStore {
    /// Append the record a create request describes. Keys are not deduplicated.
    pub fn apply(&mut self, request: &CreateRequest) -> EntityKey {
        match request.to_entity() {
            Entity::Namespace(ns) => self.namespaces.push(ns),
            Entity::User(user) => self.users.push(user),
            Entity::Role(role) => self.roles.push(role),
            Entity::NetworkPolicy(policy) => self.network_policies.push(policy),
            Entity::EgressIp(eip) => self.egress_ips.push(eip),
        }
        request.key()
    }

    /// Drop every record matching `key`; returns how many were removed
    pub fn remove(&mut self, key: &EntityKey) -> usize {
        fn retain<T>(items: &mut Vec<T>, keep: impl Fn(&T) -> bool) -> usize {
            let before = items.len();
            items.retain(keep);
            before - items.len()
        }

        match key {
            EntityKey::Namespace(name) => retain(&mut self.namespaces, |ns| &ns.name != name),
            EntityKey::User(username) => retain(&mut self.users, |u| &u.username != username),
            EntityKey::Role { kind, name } => {
                retain(&mut self.roles, |r| !(r.kind == *kind && &r.name == name))
            }
            EntityKey::NetworkPolicy { namespace, name } => {
                retain(&mut self.network_policies, |p| {
                    !(&p.namespace == namespace && &p.name == name)
                })
            }
            EntityKey::EgressIp(ip) => retain(&mut self.egress_ips, |e| &e.ip != ip),
        }
    }

    /// Replace one collection with freshly loaded records
    pub fn replace(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::Namespaces(items) => self.namespaces = items,
            Loaded::Users(items) => self.users = items,
            Loaded::Roles(items) => self.roles = items,
            Loaded::NetworkPolicies(items) => self.network_policies = items,
            Loaded::EgressIps(items) => self.egress_ips = items,
        }
    }

    pub fn find(&self, key: &EntityKey) -> Option<Entity> {
        match key {
            EntityKey::Namespace(name) => self
                .namespaces
                .iter()
                .find(|ns| &ns.name == name)
                .cloned()
                .map(Entity::Namespace),
            EntityKey::User(username) => self
                .users
                .iter()
                .find(|u| &u.username == username)
                .cloned()
                .map(Entity::User),
            EntityKey::Role { kind, name } => self
                .roles
                .iter()
                .find(|r| r.kind == *kind && &r.name == name)
                .cloned()
                .map(Entity::Role),
            EntityKey::NetworkPolicy { namespace, name } => self
                .network_policies
                .iter()
                .find(|p| &p.namespace == namespace && &p.name == name)
                .cloned()
                .map(Entity::NetworkPolicy),
            EntityKey::EgressIp(ip) => self
                .egress_ips
                .iter()
                .find(|e| &e.ip == ip)
                .cloned()
                .map(Entity::EgressIp),
        }
    }

    /// Summary lines shown when a row's view action is used
    pub fn describe(&self, key: &EntityKey) -> Option<Vec<String>> {
        let lines = match self.find(key)? {
            Entity::Namespace(ns) => vec![
                format!("Namespace: {}", ns.name),
                format!("Status: {}", ns.status),
                format!("Labels: {}", format_labels(&ns.labels)),
            ],
            Entity::User(user) => vec![
                format!("User: {}", user.username),
                format!("Email: {}", user.email),
                format!("Roles: {}", user.roles.join(", ")),
            ],
            Entity::Role(role) => vec![
                format!("Role: {}", role.name),
                format!("Type: {}", role.kind),
                format!("Resources: {}", role.resources),
                format!("Verbs: {}", role.verbs),
            ],
            Entity::NetworkPolicy(policy) => vec![
                format!("Policy: {}", policy.name),
                format!("Namespace: {}", policy.namespace),
                format!("Type: {}", policy.policy_type),
            ],
            Entity::EgressIp(eip) => vec![
                format!("IP: {}", eip.ip),
                format!(
                    "Namespace: {}",
                    if eip.namespace.is_empty() { UNKNOWN } else { eip.namespace.as_str() }
                ),
                format!("Node: {}", eip.node),
                format!("Type: {}", eip.egress_type),
            ],
        };
        Some(lines)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            namespaces: self.namespaces.len(),
            users: self.users.len(),
            roles: self.roles.len(),
            network_policies: self.network_policies.len(),
            egress_ips: self.egress_ips.len(),
        }
    }

    pub fn len(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Namespaces => self.namespaces.len(),
            ResourceKind::Users => self.users.len(),
            ResourceKind::Roles => self.roles.len(),
            ResourceKind::NetworkPolicies => self.network_policies.len(),
            ResourceKind::EgressIps => self.egress_ips.len(),
        }
    }

    pub fn namespace_names(&self) -> Vec<String> {
        self.namespaces.iter().map(|ns| ns.name.clone()).collect()
    }

    /// Distinct role names; a Role and a ClusterRole may share one
    pub fn role_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for role in &self.roles {
            if !names.contains(&role.name) {
                names.push(role.name.clone());
            }
        }
        names
    }
}

/// Per-kind counters that tell a current load result from a stale one.
///
/// A load takes a revision when it starts. Starting another load or
/// changing the mirror moves the revision on, so results from earlier
/// loads no longer match and are dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadRevisions {
    current: HashMap<ResourceKind, u32>,
}

impl LoadRevisions {
    /// Move `kind` to a new revision and return it
    pub fn bump(&mut self, kind: ResourceKind) -> u32 {
        let revision = self.current.entry(kind).or_insert(0);
        *revision += 1;
        *revision
    }

    pub fn bump_all(&mut self) {
        for kind in ResourceKind::ALL {
            self.bump(kind);
        }
    }

    pub fn is_current(&self, kind: ResourceKind, revision: u32) -> bool {
        self.current.get(&kind) == Some(&revision)
    }
}
