//! Resource manifests sent to and read from the cluster API
//!
//! The same types serialize request bodies and deserialize list responses.
//! Every field is defaulted so partial objects from the server still parse.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::labels::{parse_labels, split_list};
use crate::model::{EgressType, PolicyType, Status};

/// Annotation carrying free-text descriptions
pub const DESCRIPTION_ANNOTATION: &str = "openshift.io/description";

/// Console-owned annotations for fields the cluster API has no home for
pub const STATUS_ANNOTATION: &str = "console.shiftdeck.io/status";
pub const LAST_LOGIN_ANNOTATION: &str = "console.shiftdeck.io/last-login";
pub const RESOURCE_COUNT_ANNOTATION: &str = "console.shiftdeck.io/resource-count";

/// Host subnet annotation prefix; the egress IP completes the key
pub const EGRESS_IP_ANNOTATION_PREFIX: &str = "egressip.shiftdeck.io/";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn namespaced(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    /// Set the description annotation, skipping empty text
    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.annotations
                .insert(DESCRIPTION_ANNOTATION.to_string(), description.to_string());
        }
        self
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn description(&self) -> String {
        self.annotation(DESCRIPTION_ANNOTATION)
            .unwrap_or_default()
            .to_string()
    }
}

/// Generic `*List` response wrapper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceObject {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NamespaceStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceStatus {
    #[serde(default)]
    pub phase: Option<String>,
}

impl NamespaceObject {
    pub fn new(name: &str, description: &str, labels: &BTreeMap<String, String>) -> Self {
        let mut metadata = ObjectMeta::named(name).with_description(description);
        metadata.labels = labels.clone();

        Self {
            api_version: "v1".to_string(),
            kind: "Namespace".to_string(),
            metadata,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserObject {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl UserObject {
    /// The user's email travels in `fullName` and its role in `groups`
    pub fn new(username: &str, email: &str, role: &str) -> Self {
        let groups = if role.is_empty() {
            Vec::new()
        } else {
            vec![role.to_string()]
        };

        Self {
            api_version: "user.openshift.io/v1".to_string(),
            kind: "User".to_string(),
            metadata: ObjectMeta::named(username),
            full_name: Some(email.to_string()),
            groups,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    #[serde(default)]
    pub api_groups: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleObject {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// Fields a role is built from
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSpec {
    pub name: String,
    pub resources: String,
    pub verbs: String,
    pub description: String,
}

impl RoleObject {
    /// Namespaced `Role`
    pub fn namespaced(namespace: &str, spec: &RoleSpec) -> Self {
        Self::build("Role", ObjectMeta::namespaced(&spec.name, namespace), spec)
    }

    /// Cluster-wide `ClusterRole`
    pub fn cluster(spec: &RoleSpec) -> Self {
        Self::build("ClusterRole", ObjectMeta::named(&spec.name), spec)
    }

    fn build(kind: &str, metadata: ObjectMeta, spec: &RoleSpec) -> Self {
        Self {
            api_version: "rbac.authorization.k8s.io/v1".to_string(),
            kind: kind.to_string(),
            metadata: metadata.with_description(&spec.description),
            rules: vec![PolicyRule {
                api_groups: vec![String::new()],
                resources: split_list(&spec.resources),
                verbs: split_list(&spec.verbs),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicyPeer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
}

/// Inbound rule; an empty peer list matches every source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngressRule {
    #[serde(default)]
    pub from: Vec<NetworkPolicyPeer>,
}

/// Outbound rule; an empty peer list matches every destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EgressRule {
    #[serde(default)]
    pub to: Vec<NetworkPolicyPeer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicySpec {
    #[serde(default)]
    pub pod_selector: LabelSelector,
    #[serde(default)]
    pub policy_types: Vec<String>,
    #[serde(default)]
    pub ingress: Vec<IngressRule>,
    #[serde(default)]
    pub egress: Vec<EgressRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicyObject {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NetworkPolicySpec,
}

/// Fields a network policy is built from
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySpec {
    pub name: String,
    pub policy_type: PolicyType,
    pub pod_selector: String,
}

impl NetworkPolicyObject {
    /// Allow yields one permissive ingress and egress rule. Anything else
    /// leaves both lists empty, which denies all traffic to selected pods.
    pub fn new(namespace: &str, spec: &PolicySpec) -> Self {
        let (ingress, egress) = match spec.policy_type {
            PolicyType::Allow => (vec![IngressRule::default()], vec![EgressRule::default()]),
            PolicyType::Deny => (Vec::new(), Vec::new()),
        };

        Self {
            api_version: "networking.k8s.io/v1".to_string(),
            kind: "NetworkPolicy".to_string(),
            metadata: ObjectMeta::namespaced(&spec.name, namespace),
            spec: NetworkPolicySpec {
                pod_selector: LabelSelector {
                    match_labels: parse_labels(&spec.pod_selector),
                },
                policy_types: vec!["Ingress".to_string(), "Egress".to_string()],
                ingress,
                egress,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSubnetSpec {
    #[serde(default, rename = "egressIPs")]
    pub egress_ips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSubnetObject {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub spec: HostSubnetSpec,
}

/// Console details of one egress IP, kept in a host subnet annotation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EgressIpNote {
    pub namespace: String,
    pub egress_type: EgressType,
    pub status: Status,
}

impl EgressIpNote {
    pub fn annotation_key(ip: &str) -> String {
        format!("{}{}", EGRESS_IP_ANNOTATION_PREFIX, ip)
    }

    /// `namespace=analytics,status=Active,type=Reserved`
    pub fn encode(&self) -> String {
        let mut fields = BTreeMap::new();
        if !self.namespace.is_empty() {
            fields.insert("namespace", self.namespace.clone());
        }
        fields.insert("status", self.status.to_string());
        fields.insert("type", self.egress_type.to_string());

        fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Missing or unreadable fields keep their defaults
    pub fn decode(text: &str) -> Self {
        let fields = parse_labels(text);
        Self {
            namespace: fields.get("namespace").cloned().unwrap_or_default(),
            egress_type: fields
                .get("type")
                .and_then(|t| t.parse().ok())
                .unwrap_or_default(),
            status: fields
                .get("status")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}

/// Append `ip` to a raw host subnet's `spec.egressIPs` and record its note.
///
/// Works on the raw JSON so fields this crate does not model survive the
/// write-back. Returns false when the IP is already present or the
/// document is not an object.
pub fn add_egress_ip(subnet: &mut Value, ip: &str, note: &EgressIpNote) -> bool {
    let Some(ips) = egress_ip_list(subnet) else {
        return false;
    };

    if ips.iter().any(|existing| existing.as_str() == Some(ip)) {
        return false;
    }
    ips.push(Value::String(ip.to_string()));

    let annotations = child_mut(subnet, "metadata", empty_object)
        .and_then(|metadata| child_mut(metadata, "annotations", empty_object))
        .and_then(Value::as_object_mut);
    if let Some(annotations) = annotations {
        annotations.insert(EgressIpNote::annotation_key(ip), Value::String(note.encode()));
    }
    true
}

/// Remove `ip` and its note from a raw host subnet. Returns false when the
/// IP was not listed.
pub fn remove_egress_ip(subnet: &mut Value, ip: &str) -> bool {
    let Some(ips) = egress_ip_list(subnet) else {
        return false;
    };

    let before = ips.len();
    ips.retain(|existing| existing.as_str() != Some(ip));
    if ips.len() == before {
        return false;
    }

    if let Some(annotations) = subnet
        .pointer_mut("/metadata/annotations")
        .and_then(Value::as_object_mut)
    {
        annotations.remove(&EgressIpNote::annotation_key(ip));
    }
    true
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

// Missing or null children are created with `empty`.
fn child_mut<'a>(parent: &'a mut Value, key: &str, empty: fn() -> Value) -> Option<&'a mut Value> {
    let child = parent.as_object_mut()?.entry(key).or_insert(Value::Null);
    if child.is_null() {
        *child = empty();
    }
    Some(child)
}

fn egress_ip_list(subnet: &mut Value) -> Option<&mut Vec<Value>> {
    let spec = child_mut(subnet, "spec", empty_object)?;
    child_mut(spec, "egressIPs", empty_array)?.as_array_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy(policy_type: PolicyType) -> Value {
        let spec = PolicySpec {
            name: "p".to_string(),
            policy_type,
            pod_selector: "app=db".to_string(),
        };
        serde_json::to_value(NetworkPolicyObject::new("web", &spec)).unwrap()
    }

    #[test]
    fn test_allow_policy_has_permissive_rules() {
        let manifest = policy(PolicyType::Allow);

        assert_eq!(manifest["kind"], "NetworkPolicy");
        assert_eq!(manifest["metadata"]["namespace"], "web");
        assert_eq!(manifest["spec"]["ingress"], json!([{ "from": [] }]));
        assert_eq!(manifest["spec"]["egress"], json!([{ "to": [] }]));
        assert_eq!(manifest["spec"]["podSelector"]["matchLabels"]["app"], "db");
    }

    #[test]
    fn test_deny_policy_has_no_rules() {
        let manifest = policy(PolicyType::Deny);

        assert_eq!(manifest["spec"]["ingress"], json!([]));
        assert_eq!(manifest["spec"]["egress"], json!([]));
    }

    #[test]
    fn test_all_selector_matches_every_pod() {
        let spec = PolicySpec {
            name: "p".to_string(),
            policy_type: PolicyType::Deny,
            pod_selector: "all".to_string(),
        };
        let manifest = NetworkPolicyObject::new("web", &spec);
        assert!(manifest.spec.pod_selector.match_labels.is_empty());
    }

    #[test]
    fn test_namespace_manifest() {
        let mut labels = BTreeMap::new();
        labels.insert("team".to_string(), "devops".to_string());

        let manifest = serde_json::to_value(NamespaceObject::new("ops", "Operations", &labels)).unwrap();
        assert_eq!(manifest["apiVersion"], "v1");
        assert_eq!(manifest["metadata"]["name"], "ops");
        assert_eq!(manifest["metadata"]["labels"]["team"], "devops");
        assert_eq!(manifest["metadata"]["annotations"][DESCRIPTION_ANNOTATION], "Operations");
        assert!(manifest.get("status").is_none());
    }

    #[test]
    fn test_role_manifest_splits_lists() {
        let spec = RoleSpec {
            name: "reader".to_string(),
            resources: "pods, services".to_string(),
            verbs: "get,list".to_string(),
            description: String::new(),
        };

        let role = RoleObject::namespaced("dev", &spec);
        assert_eq!(role.kind, "Role");
        assert_eq!(role.metadata.namespace.as_deref(), Some("dev"));
        assert_eq!(role.rules[0].api_groups, vec![""]);
        assert_eq!(role.rules[0].resources, vec!["pods", "services"]);
        assert_eq!(role.rules[0].verbs, vec!["get", "list"]);
        assert!(role.metadata.annotations.is_empty());

        let cluster = RoleObject::cluster(&spec);
        assert_eq!(cluster.kind, "ClusterRole");
        assert!(cluster.metadata.namespace.is_none());
    }

    fn reserved_in(namespace: &str) -> EgressIpNote {
        EgressIpNote {
            namespace: namespace.to_string(),
            egress_type: EgressType::Reserved,
            status: Status::Active,
        }
    }

    #[test]
    fn test_add_egress_ip_is_idempotent() {
        let mut subnet = json!({ "metadata": { "name": "worker-1" }, "subnet": "10.128.0.0/23" });
        let note = reserved_in("analytics");

        assert!(add_egress_ip(&mut subnet, "10.0.1.100", &note));
        assert!(!add_egress_ip(&mut subnet, "10.0.1.100", &note));
        assert_eq!(subnet["spec"]["egressIPs"], json!(["10.0.1.100"]));
        assert_eq!(subnet["subnet"], "10.128.0.0/23");
        assert_eq!(
            subnet["metadata"]["annotations"]["egressip.shiftdeck.io/10.0.1.100"],
            "namespace=analytics,status=Active,type=Reserved"
        );
    }

    #[test]
    fn test_remove_egress_ip() {
        let mut subnet = json!({
            "metadata": { "annotations": { "egressip.shiftdeck.io/10.0.1.100": "namespace=web" } },
            "spec": { "egressIPs": ["10.0.1.100", "10.0.1.101"] }
        });

        assert!(remove_egress_ip(&mut subnet, "10.0.1.100"));
        assert!(!remove_egress_ip(&mut subnet, "10.0.1.100"));
        assert_eq!(subnet["spec"]["egressIPs"], json!(["10.0.1.101"]));
        assert_eq!(subnet["metadata"]["annotations"], json!({}));
    }

    #[test]
    fn test_non_object_subnet_is_rejected() {
        let mut subnet = json!("not a subnet");
        assert!(!add_egress_ip(&mut subnet, "10.0.1.100", &EgressIpNote::default()));
    }

    #[test]
    fn test_egress_ip_note_decode() {
        let note = reserved_in("default");
        assert_eq!(EgressIpNote::decode(&note.encode()), note);

        let partial = EgressIpNote::decode("type=Bogus,status=Inactive");
        assert_eq!(partial.namespace, "");
        assert_eq!(partial.egress_type, EgressType::Assigned);
        assert_eq!(partial.status, Status::Inactive);
    }

    #[test]
    fn test_user_manifest_groups() {
        assert_eq!(UserObject::new("dev", "dev@example.com", "view").groups, vec!["view"]);
        assert!(UserObject::new("dev", "dev@example.com", "").groups.is_empty());
    }
}
