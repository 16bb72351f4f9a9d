//! Cluster API client tests against the sandbox cluster
//! Covers auth handling, CRUD helpers, egress IP assignment and typed loading

mod common;

use std::cell::RefCell;

use async_trait::async_trait;
use common::{MemoryTokenStore, TestEnv};
use serde_json::json;
use shiftdeck_common::manifest::{EgressIpNote, PolicySpec, RoleSpec};
use shiftdeck_common::model::{EgressType, Entity, NamespacePhase, PolicyType, RoleKind, Status};
use shiftdeck_common::paths;
use shiftdeck_common::sandbox::SandboxCluster;
use shiftdeck_common::store::{CreateRequest, Loaded};
use shiftdeck_common::view::ToastKind;
use shiftdeck_common::{
    ApiRequest, ApiResponse, ClusterClient, ConsoleConfig, ConsoleStore, EntityKey, ResourceKind,
    TokenStore, Transport,
};

// ============== Auth Tests ==============

#[tokio::test]
async fn test_set_token_persists() {
    let env = TestEnv::signed_out();
    env.client.set_token("abc123");

    assert_eq!(env.client.token().as_deref(), Some("abc123"));
    assert_eq!(env.storage.value(&env.config.token_key).as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_token_and_namespace_restored_on_start() {
    let storage = MemoryTokenStore::with("openshift-token", SandboxCluster::TOKEN);
    storage.save("openshift-namespace", "analytics");

    let env = TestEnv::with_storage(storage);
    assert!(env.client.is_authenticated());
    assert_eq!(env.client.namespace(), "analytics");
    assert!(env.client.get(paths::NAMESPACES).await.is_some());
}

#[tokio::test]
async fn test_namespace_defaults_and_persists() {
    let env = TestEnv::new();
    assert_eq!(env.client.namespace(), "default");

    env.client.set_namespace("my-project");
    assert_eq!(env.storage.value(&env.config.namespace_key).as_deref(), Some("my-project"));
}

#[tokio::test]
async fn test_request_without_token_is_rejected_locally() {
    let env = TestEnv::signed_out();

    assert!(env.client.get(paths::NAMESPACES).await.is_none());
    assert!(!env.client.delete(&paths::namespace("default")).await);
    assert_eq!(env.sandbox().received(), 0);
}

#[tokio::test]
async fn test_401_expires_session() {
    let env = TestEnv::signed_out();
    env.client.set_token("stale-token");

    assert!(env.client.get(paths::NAMESPACES).await.is_none());
    assert_eq!(env.sandbox().received(), 1);

    assert!(env.client.token().is_none());
    assert!(env.storage.value(&env.config.token_key).is_none());

    let toasts = env.toasts.borrow();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert!(toasts[0].lines[0].starts_with("Session expired"));
    drop(toasts);

    // Stays signed out until a new token is set
    assert!(env.client.get(paths::USERS).await.is_none());
    assert_eq!(env.sandbox().received(), 1);

    env.client.set_token(SandboxCluster::TOKEN);
    assert!(env.client.get(paths::USERS).await.is_some());
    assert_eq!(env.sandbox().received(), 2);
}

#[tokio::test]
async fn test_clear_token_signs_out() {
    let env = TestEnv::new();
    env.client.clear_token();

    assert!(!env.client.is_authenticated());
    assert!(env.storage.value(&env.config.token_key).is_none());
    assert!(env.toasts.borrow().is_empty());
}

/// Transport that records requests before passing them to the sandbox
struct RecordingTransport {
    inner: SandboxCluster,
    seen: RefCell<Vec<ApiRequest>>,
}

#[async_trait(?Send)]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> shiftdeck_common::Result<ApiResponse> {
        self.seen.borrow_mut().push(request.clone());
        self.inner.send(request).await
    }
}

#[tokio::test]
async fn test_request_headers() {
    let transport = RecordingTransport {
        inner: SandboxCluster::seeded(),
        seen: RefCell::new(Vec::new()),
    };
    let client = ClusterClient::new(&ConsoleConfig::default(), transport, MemoryTokenStore::default());
    client.set_token(SandboxCluster::TOKEN);

    assert!(client.create_namespace("web", "").await.is_some());

    let seen = client.transport().seen.borrow();
    let request = &seen[0];
    assert_eq!(request.url, format!("{}{}", SandboxCluster::BASE_URL, paths::NAMESPACES));
    assert_eq!(request.header("authorization"), Some("Bearer sandbox-token"));
    assert_eq!(request.header("Content-Type"), Some("application/json"));
    assert_eq!(request.header("Accept"), Some("application/json"));
}

// ============== Health ==============

#[tokio::test]
async fn test_health_check() {
    let env = TestEnv::new();
    assert!(env.client.health_check().await);

    let env = TestEnv::signed_out();
    assert!(!env.client.health_check().await);
}

// ============== CRUD Tests ==============

#[tokio::test]
async fn test_namespace_lifecycle() {
    let env = TestEnv::new();

    let created = env.client.create_namespace("team-a", "Team A workloads").await.unwrap();
    assert_eq!(created["metadata"]["name"], "team-a");
    assert_eq!(created["status"]["phase"], "Active");
    assert_eq!(env.sandbox().count(paths::NAMESPACES), 6);

    assert!(env.client.create_namespace("team-a", "").await.is_none());

    assert!(env.client.delete_namespace("team-a").await);
    assert!(!env.client.delete_namespace("team-a").await);
    assert_eq!(env.sandbox().count(paths::NAMESPACES), 5);
}

#[tokio::test]
async fn test_user_manifest_carries_email() {
    let env = TestEnv::new();

    let created = env.client.create_user("dev3", "dev3@example.com", "view").await.unwrap();
    assert_eq!(created["kind"], "User");
    assert_eq!(created["fullName"], "dev3@example.com");
    assert_eq!(created["groups"], json!(["view"]));

    assert!(env.client.delete_user("dev3").await);
}

#[tokio::test]
async fn test_network_policy_manifests() {
    let env = TestEnv::new();

    let allow = PolicySpec {
        name: "allow-web".to_string(),
        policy_type: PolicyType::Allow,
        pod_selector: "app=web".to_string(),
    };
    let created = env.client.create_network_policy("my-project", &allow).await.unwrap();
    assert_eq!(created["spec"]["ingress"], json!([{ "from": [] }]));
    assert_eq!(created["spec"]["egress"], json!([{ "to": [] }]));
    assert_eq!(created["spec"]["policyTypes"], json!(["Ingress", "Egress"]));

    let deny = PolicySpec {
        name: "deny-web".to_string(),
        policy_type: PolicyType::Deny,
        pod_selector: "all".to_string(),
    };
    let created = env.client.create_network_policy("my-project", &deny).await.unwrap();
    assert_eq!(created["spec"]["ingress"], json!([]));
    assert_eq!(created["spec"]["egress"], json!([]));
    assert_eq!(created["spec"]["podSelector"], json!({ "matchLabels": {} }));

    let listed = env.client.get_network_policies(Some("my-project")).await.unwrap();
    assert_eq!(listed["items"].as_array().unwrap().len(), 5);

    assert!(env.client.delete_network_policy("my-project", "deny-web").await);
}

#[tokio::test]
async fn test_cluster_and_namespaced_roles() {
    let env = TestEnv::new();
    let spec = RoleSpec {
        name: "pod-reader".to_string(),
        resources: "pods".to_string(),
        verbs: "get,list".to_string(),
        description: "Reads pods".to_string(),
    };

    let cluster = env.client.create_cluster_role(&spec).await.unwrap();
    assert_eq!(cluster["kind"], "ClusterRole");
    let local = env.client.create_role("default", &spec).await.unwrap();
    assert_eq!(local["kind"], "Role");
    assert_eq!(local["metadata"]["namespace"], "default");

    let Some(Loaded::Roles(roles)) = env.client.load(ResourceKind::Roles).await else {
        panic!("roles did not load");
    };
    assert_eq!(roles.len(), 7);
    let namespaced: Vec<_> = roles.iter().filter(|r| r.kind == RoleKind::Role).collect();
    assert_eq!(namespaced.len(), 1);
    assert_eq!(namespaced[0].verbs, "get,list");
    assert_eq!(namespaced[0].description, "Reads pods");

    assert!(env.client.delete_role("default", "pod-reader").await);
    assert!(env.client.delete_cluster_role("pod-reader").await);
}

// ============== Egress IP Tests ==============

fn note(namespace: &str, egress_type: EgressType) -> EgressIpNote {
    EgressIpNote {
        namespace: namespace.to_string(),
        egress_type,
        status: Status::Active,
    }
}

#[tokio::test]
async fn test_assign_egress_ip_is_idempotent() {
    let env = TestEnv::new();
    let note = note("analytics", EgressType::Reserved);

    let updated = env.client.assign_egress_ip("10.0.1.103", "worker-2", &note).await.unwrap();
    assert_eq!(updated["spec"]["egressIPs"], json!(["10.0.1.101", "10.0.1.103"]));
    assert_eq!(updated["subnet"], "10.128.2.0/23");
    assert_eq!(
        updated["metadata"]["annotations"][EgressIpNote::annotation_key("10.0.1.103")],
        note.encode()
    );

    let received = env.sandbox().received();
    assert!(env.client.assign_egress_ip("10.0.1.103", "worker-2", &note).await.is_none());
    // Only the GET went out; no write-back for an existing IP
    assert_eq!(env.sandbox().received(), received + 1);
}

#[tokio::test]
async fn test_assign_to_missing_node() {
    let env = TestEnv::new();
    let note = note("analytics", EgressType::Assigned);
    assert!(env.client.assign_egress_ip("10.0.1.200", "worker-9", &note).await.is_none());
}

#[tokio::test]
async fn test_release_egress_ip() {
    let env = TestEnv::new();

    let updated = env.client.release_egress_ip("10.0.1.100", "worker-1").await.unwrap();
    assert_eq!(updated["spec"]["egressIPs"], json!(["10.0.1.102"]));
    let annotations = &updated["metadata"]["annotations"];
    assert!(annotations.get(EgressIpNote::annotation_key("10.0.1.100")).is_none());
    assert!(annotations.get(EgressIpNote::annotation_key("10.0.1.102")).is_some());
    assert!(env.client.release_egress_ip("10.0.1.100", "worker-1").await.is_none());
}

#[tokio::test]
async fn test_delete_egress_ip_by_namespaced_path() {
    let env = TestEnv::new();
    // The sandbox keeps no namespaced egress IP objects
    assert!(!env.client.delete_egress_ip("10.0.1.100", "my-project").await);
}

// ============== Loading and dispatch ==============

#[tokio::test]
async fn test_load_every_kind() {
    let env = TestEnv::new();
    let mut store = ConsoleStore::default();

    for kind in ResourceKind::ALL {
        let loaded = env.client.load(kind).await.unwrap();
        assert_eq!(loaded.kind(), kind);
        store.replace(loaded);
    }

    let stats = store.stats();
    assert_eq!(stats.namespaces, 5);
    assert_eq!(stats.users, 5);
    assert_eq!(stats.roles, 5);
    assert_eq!(stats.network_policies, 4);
    assert_eq!(stats.egress_ips, 3);

    let default = store.namespaces.iter().find(|ns| ns.name == "default").unwrap();
    assert_eq!(default.resources, 12);
    assert_eq!(default.status, NamespacePhase::Active);

    let readonly = store.users.iter().find(|u| u.username == "readonly1").unwrap();
    assert_eq!(readonly.status, Status::Inactive);
    assert_eq!(readonly.last_login, "2 days ago");

    let reserved = store.egress_ips.iter().find(|e| e.ip == "10.0.1.102").unwrap();
    assert_eq!(reserved.namespace, "default");
    assert_eq!(reserved.egress_type, EgressType::Reserved);
    assert_eq!(reserved.status, Status::Inactive);

    let db = store
        .network_policies
        .iter()
        .find(|p| p.name == "allow-database")
        .unwrap();
    assert_eq!(db.pod_selector, "app=database");
    assert_eq!(db.policy_type, PolicyType::Allow);
}

#[tokio::test]
async fn test_load_fails_when_signed_out() {
    let env = TestEnv::signed_out();
    assert!(env.client.load(ResourceKind::Users).await.is_none());
}

#[tokio::test]
async fn test_store_follows_successful_calls_only() {
    let env = TestEnv::new();
    let mut store = ConsoleStore::default();
    store.replace(env.client.load(ResourceKind::EgressIps).await.unwrap());

    let request = CreateRequest::EgressIp {
        ip: "10.0.1.110".to_string(),
        namespace: "analytics".to_string(),
        node: "worker-1".to_string(),
        egress_type: EgressType::Assigned,
    };

    assert!(env.client.create_entity(&request).await);
    store.apply(&request);
    assert_eq!(store.egress_ips.len(), 4);

    // Already assigned: the client refuses and the mirror stays put
    if env.client.create_entity(&request).await {
        store.apply(&request);
    }
    assert_eq!(store.egress_ips.len(), 4);

    let entity = store.find(&request.key()).unwrap();
    assert!(env.client.delete_entity(&entity).await);
    assert_eq!(store.remove(&request.key()), 1);

    let reloaded = env.client.load(ResourceKind::EgressIps).await.unwrap();
    store.replace(reloaded);
    assert_eq!(store.stats().egress_ips, 3);
}

#[tokio::test]
async fn test_role_dispatch_uses_session_namespace() {
    let env = TestEnv::new();
    env.client.set_namespace("analytics");

    let request = CreateRequest::Role {
        name: "auditor".to_string(),
        kind: RoleKind::Role,
        resources: "events".to_string(),
        verbs: "list".to_string(),
        description: String::new(),
    };
    assert!(env.client.create_entity(&request).await);
    assert_eq!(env.sandbox().count(&paths::roles("analytics")), 1);

    let mut store = ConsoleStore::default();
    store.apply(&request);
    let entity = store.find(&request.key()).unwrap();
    assert!(env.client.delete_entity(&entity).await);
    assert_eq!(env.sandbox().count(&paths::roles("analytics")), 0);
}

#[tokio::test]
async fn test_role_and_cluster_role_sharing_a_name() {
    let env = TestEnv::new();
    for kind in [RoleKind::ClusterRole, RoleKind::Role] {
        let request = CreateRequest::Role {
            name: "auditor".to_string(),
            kind,
            resources: "events".to_string(),
            verbs: "list".to_string(),
            description: String::new(),
        };
        assert!(env.client.create_entity(&request).await);
    }

    let mut store = ConsoleStore::default();
    store.replace(env.client.load(ResourceKind::Roles).await.unwrap());
    assert_eq!(store.roles.iter().filter(|r| r.name == "auditor").count(), 2);

    let key = EntityKey::Role {
        kind: RoleKind::Role,
        name: "auditor".to_string(),
    };
    let entity = store.find(&key).unwrap();
    assert!(matches!(&entity, Entity::Role(role) if role.kind == RoleKind::Role));

    assert!(env.client.delete_entity(&entity).await);
    assert_eq!(store.remove(&key), 1);
    assert_eq!(env.sandbox().count(&paths::roles("default")), 0);
    assert!(env.client.get(&paths::cluster_role("auditor")).await.is_some());

    store.replace(env.client.load(ResourceKind::Roles).await.unwrap());
    let remaining: Vec<_> = store.roles.iter().filter(|r| r.name == "auditor").collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].kind, RoleKind::ClusterRole);
}

#[tokio::test]
async fn test_created_records_match_after_reload() {
    let env = TestEnv::new();
    let requests = vec![
        CreateRequest::Namespace {
            name: "team-b".to_string(),
            description: "Team B".to_string(),
        },
        CreateRequest::User {
            username: "dev9".to_string(),
            email: "dev9@example.com".to_string(),
            role: "view".to_string(),
        },
        CreateRequest::Role {
            name: "pod-reader".to_string(),
            kind: RoleKind::ClusterRole,
            resources: "pods,services".to_string(),
            verbs: "get,list".to_string(),
            description: "Reads pods".to_string(),
        },
        CreateRequest::Role {
            name: "event-reader".to_string(),
            kind: RoleKind::Role,
            resources: "events".to_string(),
            verbs: "list".to_string(),
            description: String::new(),
        },
        CreateRequest::NetworkPolicy {
            name: "allow-api".to_string(),
            namespace: "analytics".to_string(),
            policy_type: PolicyType::Allow,
            pod_selector: "tier=api, app=web".to_string(),
        },
        CreateRequest::EgressIp {
            ip: "10.0.1.150".to_string(),
            namespace: "analytics".to_string(),
            node: "worker-2".to_string(),
            egress_type: EgressType::Reserved,
        },
    ];

    for request in &requests {
        assert!(env.client.create_entity(request).await);
        let mut mirrored = ConsoleStore::default();
        mirrored.apply(request);

        let mut reloaded = ConsoleStore::default();
        reloaded.replace(env.client.load(request.key().kind()).await.unwrap());

        assert_eq!(
            reloaded.find(&request.key()),
            mirrored.find(&request.key()),
            "{:?}",
            request.key()
        );
    }
}
