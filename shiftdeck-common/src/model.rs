//! Entity model for the five resource kinds the console manages

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Resource kinds shown in the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Namespaces,
    Users,
    Roles,
    NetworkPolicies,
    EgressIps,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Namespaces,
        ResourceKind::Users,
        ResourceKind::Roles,
        ResourceKind::NetworkPolicies,
        ResourceKind::EgressIps,
    ];

    /// Singular label used in notifications ("Namespace \"x\" created")
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Namespaces => "Namespace",
            ResourceKind::Users => "User",
            ResourceKind::Roles => "Role",
            ResourceKind::NetworkPolicies => "Network Policy",
            ResourceKind::EgressIps => "Egress IP",
        }
    }

    /// Plural label used for section titles
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Namespaces => "Namespaces",
            ResourceKind::Users => "Users",
            ResourceKind::Roles => "Roles",
            ResourceKind::NetworkPolicies => "Network Policies",
            ResourceKind::EgressIps => "Egress IPs",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

/// Namespace lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamespacePhase {
    #[default]
    Active,
    Terminating,
}

impl fmt::Display for NamespacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Terminating => write!(f, "Terminating"),
        }
    }
}

/// Active/Inactive status shared by users, policies and egress IPs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            other => Err(Error::Validation(format!("Unknown status: {}", other))),
        }
    }
}

/// RBAC role scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoleKind {
    Role,
    #[default]
    ClusterRole,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role => write!(f, "Role"),
            Self::ClusterRole => write!(f, "ClusterRole"),
        }
    }
}

impl FromStr for RoleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Role" => Ok(Self::Role),
            "ClusterRole" => Ok(Self::ClusterRole),
            other => Err(Error::Validation(format!("Unknown role type: {}", other))),
        }
    }
}

/// Network policy effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolicyType {
    #[default]
    Allow,
    Deny,
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "Allow"),
            Self::Deny => write!(f, "Deny"),
        }
    }
}

impl FromStr for PolicyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(Self::Allow),
            "Deny" => Ok(Self::Deny),
            other => Err(Error::Validation(format!("Unknown policy type: {}", other))),
        }
    }
}

/// Egress IP allocation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EgressType {
    #[default]
    Assigned,
    Reserved,
}

impl fmt::Display for EgressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned => write!(f, "Assigned"),
            Self::Reserved => write!(f, "Reserved"),
        }
    }
}

impl FromStr for EgressType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Assigned" => Ok(Self::Assigned),
            "Reserved" => Ok(Self::Reserved),
            other => Err(Error::Validation(format!("Unknown egress IP type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    pub status: NamespacePhase,
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
    pub resources: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub status: Status,
    pub last_login: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoleKind,
    pub resources: String, // comma-joined resource types
    pub verbs: String,     // comma-joined verbs
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPolicy {
    pub name: String,
    pub namespace: String,
    pub policy_type: PolicyType,
    pub pod_selector: String, // label selector expression or "all"
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgressIp {
    pub ip: String,
    pub namespace: String,
    pub node: String,
    pub egress_type: EgressType,
    pub status: Status,
}

/// Identity of a record within its collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Namespace(String),
    User(String),
    Role { kind: RoleKind, name: String },
    NetworkPolicy { namespace: String, name: String },
    EgressIp(String),
}

impl EntityKey {
    pub fn kind(&self) -> ResourceKind {
        match self {
            EntityKey::Namespace(_) => ResourceKind::Namespaces,
            EntityKey::User(_) => ResourceKind::Users,
            EntityKey::Role { .. } => ResourceKind::Roles,
            EntityKey::NetworkPolicy { .. } => ResourceKind::NetworkPolicies,
            EntityKey::EgressIp(_) => ResourceKind::EgressIps,
        }
    }

    /// Display name used in prompts and notifications
    pub fn label(&self) -> &str {
        match self {
            EntityKey::Namespace(name)
            | EntityKey::User(name)
            | EntityKey::EgressIp(name) => name,
            EntityKey::Role { name, .. } | EntityKey::NetworkPolicy { name, .. } => name,
        }
    }
}

/// An owned record of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Namespace(Namespace),
    User(User),
    Role(Role),
    NetworkPolicy(NetworkPolicy),
    EgressIp(EgressIp),
}

impl Entity {
    pub fn key(&self) -> EntityKey {
        match self {
            Entity::Namespace(ns) => EntityKey::Namespace(ns.name.clone()),
            Entity::User(user) => EntityKey::User(user.username.clone()),
            Entity::Role(role) => EntityKey::Role {
                kind: role.kind,
                name: role.name.clone(),
            },
            Entity::NetworkPolicy(policy) => EntityKey::NetworkPolicy {
                namespace: policy.namespace.clone(),
                name: policy.name.clone(),
            },
            Entity::EgressIp(eip) => EntityKey::EgressIp(eip.ip.clone()),
        }
    }
}
