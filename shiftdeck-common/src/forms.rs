//! Modal form descriptors and submit-time validation
//!
//! Each `ModalKind` describes its fields, its initial values and how a
//! filled form turns into a `FormAction`. The UI renders the descriptors
//! generically and never interprets field ids itself.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::model::{EgressType, PolicyType, ResourceKind, RoleKind};
use crate::store::{ConsoleStore, CreateRequest};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    NewNamespace,
    NewUser,
    NewRole,
    NewNetworkPolicy,
    NewEgressIp,
    Connect,
}

/// The create form for a collection
impl From<ResourceKind> for ModalKind {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Namespaces => ModalKind::NewNamespace,
            ResourceKind::Users => ModalKind::NewUser,
            ResourceKind::Roles => ModalKind::NewRole,
            ResourceKind::NetworkPolicies => ModalKind::NewNetworkPolicy,
            ResourceKind::EgressIps => ModalKind::NewEgressIp,
        }
    }
}

/// What a successfully validated form asks the console to do
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    Create(CreateRequest),
    Connect { token: String, namespace: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn same(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    Text { placeholder: &'static str },
    Email,
    Password,
    TextArea { placeholder: &'static str, rows: u32 },
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub id: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub required: bool,
}

impl FormField {
    fn text(id: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            id,
            label,
            input: InputKind::Text { placeholder },
            required: true,
        }
    }

    fn select(id: &'static str, label: &'static str, options: Vec<SelectOption>) -> Self {
        Self {
            id,
            label,
            input: InputKind::Select { options },
            required: true,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Current field values keyed by field id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn set(&mut self, id: &str, value: impl Into<String>) {
        self.0.insert(id.to_string(), value.into());
    }

    /// Trimmed value, empty when the field was never touched
    pub fn get(&self, id: &str) -> &str {
        self.0.get(id).map(|v| v.trim()).unwrap_or("")
    }

    /// Untrimmed value as last typed
    pub fn raw(&self, id: &str) -> &str {
        self.0.get(id).map(String::as_str).unwrap_or("")
    }
}

// Field ids
const NAMESPACE_NAME: &str = "namespaceName";
const NAMESPACE_DESCRIPTION: &str = "namespaceDescription";
const USERNAME: &str = "username";
const USER_EMAIL: &str = "userEmail";
const USER_ROLE: &str = "userRole";
const ROLE_NAME: &str = "roleName";
const ROLE_TYPE: &str = "roleType";
const ROLE_RESOURCES: &str = "roleResources";
const ROLE_VERBS: &str = "roleVerbs";
const ROLE_DESCRIPTION: &str = "roleDescription";
const POLICY_NAME: &str = "policyName";
const POLICY_NAMESPACE: &str = "policyNamespace";
const POLICY_TYPE: &str = "policyType";
const POLICY_SELECTOR: &str = "policyPodSelector";
const EGRESS_IP: &str = "egressIP";
const EGRESS_NAMESPACE: &str = "egressNamespace";
const EGRESS_NODE: &str = "egressNode";
const EGRESS_TYPE: &str = "egressType";
const CONNECT_TOKEN: &str = "connectToken";
const CONNECT_NAMESPACE: &str = "connectNamespace";

impl ModalKind {
    pub fn title(&self) -> &'static str {
        match self {
            ModalKind::NewNamespace => "Create Namespace",
            ModalKind::NewUser => "Create User",
            ModalKind::NewRole => "Create Role",
            ModalKind::NewNetworkPolicy => "Create Network Policy",
            ModalKind::NewEgressIp => "Create Egress IP",
            ModalKind::Connect => "Connect to Cluster",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            ModalKind::NewNamespace => "Create Namespace",
            ModalKind::NewUser => "Create User",
            ModalKind::NewRole => "Create Role",
            ModalKind::NewNetworkPolicy => "Create Policy",
            ModalKind::NewEgressIp => "Create Egress IP",
            ModalKind::Connect => "Connect",
        }
    }

    /// Collection the form's record dropdown is filled from
    pub fn option_source(&self) -> Option<ResourceKind> {
        match self {
            ModalKind::NewUser => Some(ResourceKind::Roles),
            ModalKind::NewNetworkPolicy | ModalKind::NewEgressIp => Some(ResourceKind::Namespaces),
            ModalKind::NewNamespace | ModalKind::NewRole | ModalKind::Connect => None,
        }
    }

    /// Field descriptors; dropdowns are filled from the current store
    pub fn fields(&self, store: &ConsoleStore) -> Vec<FormField> {
        let namespaces = || {
            store
                .namespace_names()
                .iter()
                .map(|name| SelectOption::same(name))
                .collect::<Vec<_>>()
        };

        match self {
            ModalKind::NewNamespace => vec![
                FormField::text(NAMESPACE_NAME, "Name", "my-namespace"),
                FormField {
                    id: NAMESPACE_DESCRIPTION,
                    label: "Description",
                    input: InputKind::TextArea {
                        placeholder: "Description...",
                        rows: 3,
                    },
                    required: false,
                },
            ],
            ModalKind::NewUser => vec![
                FormField::text(USERNAME, "Username", "username"),
                FormField {
                    id: USER_EMAIL,
                    label: "Email",
                    input: InputKind::Email,
                    required: true,
                },
                FormField::select(
                    USER_ROLE,
                    "Role",
                    store
                        .role_names()
                        .iter()
                        .map(|name| SelectOption::same(name))
                        .collect(),
                ),
            ],
            ModalKind::NewRole => vec![
                FormField::text(ROLE_NAME, "Name", "my-role"),
                FormField::select(
                    ROLE_TYPE,
                    "Type",
                    [RoleKind::ClusterRole, RoleKind::Role]
                        .iter()
                        .map(|kind| SelectOption::same(&kind.to_string()))
                        .collect(),
                ),
                FormField::text(ROLE_RESOURCES, "Resources", "pods,services,deployments"),
                FormField::text(ROLE_VERBS, "Verbs", "get,list,watch"),
                FormField {
                    id: ROLE_DESCRIPTION,
                    label: "Description",
                    input: InputKind::TextArea {
                        placeholder: "Description...",
                        rows: 2,
                    },
                    required: false,
                },
            ],
            ModalKind::NewNetworkPolicy => vec![
                FormField::text(POLICY_NAME, "Name", "my-policy"),
                FormField::select(POLICY_NAMESPACE, "Namespace", namespaces()),
                FormField::select(
                    POLICY_TYPE,
                    "Type",
                    [PolicyType::Allow, PolicyType::Deny]
                        .iter()
                        .map(|ty| SelectOption::same(&ty.to_string()))
                        .collect(),
                ),
                FormField::text(POLICY_SELECTOR, "Pod Selector", "app=myapp"),
            ],
            ModalKind::NewEgressIp => vec![
                FormField::text(EGRESS_IP, "IP", "10.0.1.100"),
                FormField::select(EGRESS_NAMESPACE, "Namespace", namespaces()),
                FormField::text(EGRESS_NODE, "Node", "worker-1"),
                FormField::select(
                    EGRESS_TYPE,
                    "Type",
                    [EgressType::Assigned, EgressType::Reserved]
                        .iter()
                        .map(|ty| SelectOption::same(&ty.to_string()))
                        .collect(),
                ),
            ],
            ModalKind::Connect => vec![
                FormField {
                    id: CONNECT_TOKEN,
                    label: "Bearer token",
                    input: InputKind::Password,
                    required: true,
                },
                FormField::text(CONNECT_NAMESPACE, "Namespace", "default").optional(),
            ],
        }
    }

    /// Values a freshly opened modal starts with
    pub fn initial_values(&self, store: &ConsoleStore, namespace: &str) -> FormValues {
        let mut values = FormValues::default();

        // Type selects start on their default. Record dropdowns start empty
        // unless the session namespace is listed.
        match self {
            ModalKind::NewRole => values.set(ROLE_TYPE, RoleKind::default().to_string()),
            ModalKind::NewNetworkPolicy => {
                values.set(POLICY_TYPE, PolicyType::default().to_string());
                if store.namespace_names().iter().any(|ns| ns == namespace) {
                    values.set(POLICY_NAMESPACE, namespace);
                }
            }
            ModalKind::NewEgressIp => {
                values.set(EGRESS_TYPE, EgressType::default().to_string());
                if store.namespace_names().iter().any(|ns| ns == namespace) {
                    values.set(EGRESS_NAMESPACE, namespace);
                }
            }
            ModalKind::Connect => values.set(CONNECT_NAMESPACE, namespace),
            ModalKind::NewNamespace | ModalKind::NewUser => {}
        }

        values
    }

    /// Validate the filled form. The first failing field wins.
    pub fn submit(&self, store: &ConsoleStore, values: &FormValues) -> Result<FormAction> {
        for field in self.fields(store) {
            if field.required && values.get(field.id).is_empty() {
                return Err(Error::Validation(format!("{} is required", field.label)));
            }
        }

        let action = match self {
            ModalKind::NewNamespace => {
                let name = values.get(NAMESPACE_NAME);
                validate_name(name)?;
                FormAction::Create(CreateRequest::Namespace {
                    name: name.to_string(),
                    description: values.get(NAMESPACE_DESCRIPTION).to_string(),
                })
            }
            ModalKind::NewUser => {
                let email = values.get(USER_EMAIL);
                if !is_email(email) {
                    return Err(Error::Validation(format!("Invalid email address: {}", email)));
                }
                FormAction::Create(CreateRequest::User {
                    username: values.get(USERNAME).to_string(),
                    email: email.to_string(),
                    role: values.get(USER_ROLE).to_string(),
                })
            }
            ModalKind::NewRole => FormAction::Create(CreateRequest::Role {
                name: values.get(ROLE_NAME).to_string(),
                kind: values.get(ROLE_TYPE).parse()?,
                resources: values.get(ROLE_RESOURCES).to_string(),
                verbs: values.get(ROLE_VERBS).to_string(),
                description: values.get(ROLE_DESCRIPTION).to_string(),
            }),
            ModalKind::NewNetworkPolicy => FormAction::Create(CreateRequest::NetworkPolicy {
                name: values.get(POLICY_NAME).to_string(),
                namespace: values.get(POLICY_NAMESPACE).to_string(),
                policy_type: values.get(POLICY_TYPE).parse()?,
                pod_selector: values.get(POLICY_SELECTOR).to_string(),
            }),
            ModalKind::NewEgressIp => {
                let ip = values.get(EGRESS_IP);
                ip.parse::<Ipv4Addr>()
                    .map_err(|_| Error::Validation(format!("Invalid IPv4 address: {}", ip)))?;
                FormAction::Create(CreateRequest::EgressIp {
                    ip: ip.to_string(),
                    namespace: values.get(EGRESS_NAMESPACE).to_string(),
                    node: values.get(EGRESS_NODE).to_string(),
                    egress_type: values.get(EGRESS_TYPE).parse()?,
                })
            }
            ModalKind::Connect => {
                let namespace = values.get(CONNECT_NAMESPACE);
                if !namespace.is_empty() {
                    validate_name(namespace)?;
                }
                FormAction::Connect {
                    token: values.get(CONNECT_TOKEN).to_string(),
                    namespace: namespace.to_string(),
                }
            }
        };

        Ok(action)
    }
}

/// Namespace names: lowercase letters, digits and dashes
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Invalid name \"{}\": use lowercase letters, digits and '-'",
            name
        )))
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ConsoleStore {
        let mut store = ConsoleStore::default();
        store.apply(&CreateRequest::Namespace {
            name: "web".to_string(),
            description: String::new(),
        });
        store.apply(&CreateRequest::Role {
            name: "view".to_string(),
            kind: RoleKind::ClusterRole,
            resources: "pods".to_string(),
            verbs: "get".to_string(),
            description: String::new(),
        });
        store
    }

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        let mut values = FormValues::default();
        for (id, value) in pairs {
            values.set(id, *value);
        }
        values
    }

    #[test]
    fn test_namespace_form() {
        let action = ModalKind::NewNamespace
            .submit(&store(), &values(&[("namespaceName", " test-ns "), ("namespaceDescription", "hello")]))
            .unwrap();

        assert_eq!(
            action,
            FormAction::Create(CreateRequest::Namespace {
                name: "test-ns".to_string(),
                description: "hello".to_string(),
            })
        );
    }

    #[test]
    fn test_required_field_missing() {
        let err = ModalKind::NewNamespace
            .submit(&store(), &values(&[("namespaceName", "   ")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_namespace_name_pattern() {
        for bad in ["Upper", "under_score", "dot.ted"] {
            let result = ModalKind::NewNamespace.submit(&store(), &values(&[("namespaceName", bad)]));
            assert!(result.is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_dropdowns_come_from_store() {
        let store = store();

        let user_fields = ModalKind::NewUser.fields(&store);
        match &user_fields[2].input {
            InputKind::Select { options } => assert_eq!(options, &vec![SelectOption::same("view")]),
            other => panic!("unexpected input {:?}", other),
        }

        let policy_fields = ModalKind::NewNetworkPolicy.fields(&store);
        match &policy_fields[1].input {
            InputKind::Select { options } => assert_eq!(options[0].value, "web"),
            other => panic!("unexpected input {:?}", other),
        }
    }

    #[test]
    fn test_initial_values() {
        let store = store();

        let policy = ModalKind::NewNetworkPolicy.initial_values(&store, "web");
        assert_eq!(policy.get("policyType"), "Allow");
        assert_eq!(policy.get("policyNamespace"), "web");

        let egress = ModalKind::NewEgressIp.initial_values(&store, "missing");
        assert_eq!(egress.get("egressNamespace"), "");
        assert_eq!(egress.get("egressType"), "Assigned");

        assert_eq!(ModalKind::NewUser.initial_values(&store, "web").get("userRole"), "");
    }

    #[test]
    fn test_egress_ip_must_be_ipv4() {
        let store = store();
        let mut form = values(&[
            ("egressIP", "10.0.1.300"),
            ("egressNamespace", "web"),
            ("egressNode", "worker-1"),
            ("egressType", "Reserved"),
        ]);
        assert!(ModalKind::NewEgressIp.submit(&store, &form).is_err());

        form.set("egressIP", "10.0.1.103");
        match ModalKind::NewEgressIp.submit(&store, &form).unwrap() {
            FormAction::Create(CreateRequest::EgressIp { ip, egress_type, .. }) => {
                assert_eq!(ip, "10.0.1.103");
                assert_eq!(egress_type, EgressType::Reserved);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_policy_type_must_parse() {
        let form = values(&[
            ("policyName", "p"),
            ("policyNamespace", "web"),
            ("policyType", "Maybe"),
            ("policyPodSelector", "app=db"),
        ]);
        assert!(ModalKind::NewNetworkPolicy.submit(&store(), &form).is_err());
    }

    #[test]
    fn test_user_email() {
        let mut form = values(&[("username", "dev"), ("userEmail", "nope"), ("userRole", "view")]);
        assert!(ModalKind::NewUser.submit(&store(), &form).is_err());

        form.set("userEmail", "dev@example.com");
        assert!(ModalKind::NewUser.submit(&store(), &form).is_ok());
    }

    #[test]
    fn test_connect_form() {
        let form = values(&[("connectToken", " sha256~abc "), ("connectNamespace", "")]);
        assert_eq!(
            ModalKind::Connect.submit(&store(), &form).unwrap(),
            FormAction::Connect {
                token: "sha256~abc".to_string(),
                namespace: String::new(),
            }
        );

        assert!(ModalKind::Connect.submit(&store(), &values(&[])).is_err());
    }
}
