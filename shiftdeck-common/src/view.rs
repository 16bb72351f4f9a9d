//! View-models rendered by the UI
//!
//! Tables and notifications are plain data. The UI inserts every string as
//! a text node, so markup inside user-supplied values is never interpreted.

use crate::labels::format_labels;
use crate::model::{EntityKey, NamespacePhase, ResourceKind, Status};
use crate::store::ConsoleStore;

/// Console sections reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Dashboard,
    Namespaces,
    Users,
    Roles,
    NetworkPolicies,
    EgressIps,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Dashboard,
        Section::Namespaces,
        Section::Users,
        Section::Roles,
        Section::NetworkPolicies,
        Section::EgressIps,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Namespaces => "namespaces",
            Section::Users => "users",
            Section::Roles => "roles",
            Section::NetworkPolicies => "networkpolicies",
            Section::EgressIps => "egressips",
        }
    }

    /// Breadcrumb label
    pub fn title(&self) -> &'static str {
        match self.resource() {
            Some(kind) => kind.plural(),
            None => "Dashboard",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Section::Dashboard => "fas fa-tachometer-alt",
            Section::Namespaces => "fas fa-cube",
            Section::Users => "fas fa-users",
            Section::Roles => "fas fa-user-tag",
            Section::NetworkPolicies => "fas fa-shield-alt",
            Section::EgressIps => "fas fa-network-wired",
        }
    }

    pub fn resource(&self) -> Option<ResourceKind> {
        match self {
            Section::Dashboard => None,
            Section::Namespaces => Some(ResourceKind::Namespaces),
            Section::Users => Some(ResourceKind::Users),
            Section::Roles => Some(ResourceKind::Roles),
            Section::NetworkPolicies => Some(ResourceKind::NetworkPolicies),
            Section::EgressIps => Some(ResourceKind::EgressIps),
        }
    }
}

impl From<ResourceKind> for Section {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Namespaces => Section::Namespaces,
            ResourceKind::Users => Section::Users,
            ResourceKind::Roles => Section::Roles,
            ResourceKind::NetworkPolicies => Section::NetworkPolicies,
            ResourceKind::EgressIps => Section::EgressIps,
        }
    }
}

/// Badge styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Active,
    Warning,
    Neutral,
}

impl Tone {
    pub fn class(&self) -> &'static str {
        match self {
            Tone::Active => "status-badge active",
            Tone::Warning => "status-badge warning",
            Tone::Neutral => "type-badge",
        }
    }

    fn of_status(status: Status) -> Self {
        match status {
            Status::Active => Tone::Active,
            Status::Inactive => Tone::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Badge { text: String, tone: Tone },
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn badge(value: impl ToString, tone: Tone) -> Self {
        Cell::Badge {
            text: value.to_string(),
            tone,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Cell::Text(text) | Cell::Badge { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: EntityKey,
    pub icon: &'static str,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: &'static [&'static str],
    pub rows: Vec<Row>,
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Build the table for one collection, one row per record
pub fn table(store: &ConsoleStore, kind: ResourceKind) -> Table {
    match kind {
        ResourceKind::Namespaces => Table {
            headers: &["Name", "Status", "Labels", "Description", "Resources"],
            rows: store
                .namespaces
                .iter()
                .map(|ns| Row {
                    key: EntityKey::Namespace(ns.name.clone()),
                    icon: "fas fa-cube",
                    cells: vec![
                        Cell::text(&ns.name),
                        Cell::badge(
                            ns.status,
                            match ns.status {
                                NamespacePhase::Active => Tone::Active,
                                NamespacePhase::Terminating => Tone::Warning,
                            },
                        ),
                        Cell::text(format_labels(&ns.labels)),
                        Cell::text(or_placeholder(&ns.description)),
                        Cell::text(ns.resources.to_string()),
                    ],
                })
                .collect(),
        },
        ResourceKind::Users => Table {
            headers: &["Username", "Email", "Roles", "Status", "Last login"],
            rows: store
                .users
                .iter()
                .map(|user| Row {
                    key: EntityKey::User(user.username.clone()),
                    icon: "fas fa-user",
                    cells: vec![
                        Cell::text(&user.username),
                        Cell::text(or_placeholder(&user.email)),
                        Cell::text(or_placeholder(&user.roles.join(", "))),
                        Cell::badge(user.status, Tone::of_status(user.status)),
                        Cell::text(&user.last_login),
                    ],
                })
                .collect(),
        },
        ResourceKind::Roles => Table {
            headers: &["Name", "Type", "Resources", "Verbs", "Description"],
            rows: store
                .roles
                .iter()
                .map(|role| Row {
                    key: EntityKey::Role {
                        kind: role.kind,
                        name: role.name.clone(),
                    },
                    icon: "fas fa-user-tag",
                    cells: vec![
                        Cell::text(&role.name),
                        Cell::badge(role.kind, Tone::Neutral),
                        Cell::text(&role.resources),
                        Cell::text(&role.verbs),
                        Cell::text(or_placeholder(&role.description)),
                    ],
                })
                .collect(),
        },
        ResourceKind::NetworkPolicies => Table {
            headers: &["Name", "Namespace", "Type", "Pod selector", "Status"],
            rows: store
                .network_policies
                .iter()
                .map(|policy| Row {
                    key: EntityKey::NetworkPolicy {
                        namespace: policy.namespace.clone(),
                        name: policy.name.clone(),
                    },
                    icon: "fas fa-shield-alt",
                    cells: vec![
                        Cell::text(&policy.name),
                        Cell::text(&policy.namespace),
                        Cell::badge(policy.policy_type, Tone::Neutral),
                        Cell::text(&policy.pod_selector),
                        Cell::badge(policy.status, Tone::of_status(policy.status)),
                    ],
                })
                .collect(),
        },
        ResourceKind::EgressIps => Table {
            headers: &["IP", "Namespace", "Node", "Type", "Status"],
            rows: store
                .egress_ips
                .iter()
                .map(|eip| Row {
                    key: EntityKey::EgressIp(eip.ip.clone()),
                    icon: "fas fa-ethernet",
                    cells: vec![
                        Cell::text(&eip.ip),
                        Cell::text(or_placeholder(&eip.namespace)),
                        Cell::text(&eip.node),
                        Cell::badge(eip.egress_type, Tone::Neutral),
                        Cell::badge(eip.status, Tone::of_status(eip.status)),
                    ],
                })
                .collect(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
    Info,
}

impl ToastKind {
    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast success",
            ToastKind::Warning => "toast warning",
            ToastKind::Error => "toast error",
            ToastKind::Info => "toast info",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "fas fa-check-circle",
            ToastKind::Warning => "fas fa-exclamation-triangle",
            ToastKind::Error => "fas fa-times-circle",
            ToastKind::Info => "fas fa-info-circle",
        }
    }
}

/// Transient notification; each line renders on its own row
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub lines: Vec<String>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            lines: vec![message.into()],
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn info_lines(lines: Vec<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoleKind;
    use crate::store::CreateRequest;

    #[test]
    fn test_section_titles() {
        assert_eq!(Section::Dashboard.title(), "Dashboard");
        assert_eq!(Section::Users.title(), "Users");
        assert_eq!(Section::EgressIps.title(), "Egress IPs");
        assert_eq!(Section::from(ResourceKind::NetworkPolicies).id(), "networkpolicies");
    }

    #[test]
    fn test_role_rows_keep_kind() {
        let mut store = ConsoleStore::default();
        for kind in [RoleKind::ClusterRole, RoleKind::Role] {
            store.apply(&CreateRequest::Role {
                name: "auditor".to_string(),
                kind,
                resources: "events".to_string(),
                verbs: "list".to_string(),
                description: String::new(),
            });
        }

        let table = table(&store, ResourceKind::Roles);
        assert_ne!(table.rows[0].key, table.rows[1].key);
        assert_eq!(
            table.rows[1].key,
            EntityKey::Role { kind: RoleKind::Role, name: "auditor".to_string() }
        );
    }

    #[test]
    fn test_table_has_one_row_per_record() {
        let mut store = ConsoleStore::default();
        store.apply(&CreateRequest::Namespace {
            name: "alpha".to_string(),
            description: String::new(),
        });
        store.apply(&CreateRequest::Namespace {
            name: "beta".to_string(),
            description: "second".to_string(),
        });

        let table = table(&store, ResourceKind::Namespaces);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells.len(), table.headers.len());
        assert_eq!(table.rows[0].cells[2].content(), "-");
        assert_eq!(table.rows[0].cells[3].content(), "-");
        assert_eq!(table.rows[1].cells[3].content(), "second");
        assert_eq!(table.rows[1].key, EntityKey::Namespace("beta".to_string()));
    }

    #[test]
    fn test_markup_stays_literal_text() {
        let mut store = ConsoleStore::default();
        store.apply(&CreateRequest::User {
            username: "<b>mallory</b>".to_string(),
            email: "m@example.com\"><script>".to_string(),
            role: "view".to_string(),
        });

        let table = table(&store, ResourceKind::Users);
        assert_eq!(table.rows[0].cells[0].content(), "<b>mallory</b>");
        assert_eq!(table.rows[0].cells[1], Cell::Text("m@example.com\"><script>".to_string()));
    }

    #[test]
    fn test_status_badge_tone() {
        let mut store = ConsoleStore::default();
        store.apply(&CreateRequest::User {
            username: "dev".to_string(),
            email: "dev@example.com".to_string(),
            role: "view".to_string(),
        });
        store.users[0].status = Status::Inactive;

        let table = table(&store, ResourceKind::Users);
        assert_eq!(
            table.rows[0].cells[3],
            Cell::Badge { text: "Inactive".to_string(), tone: Tone::Warning }
        );
    }
}
