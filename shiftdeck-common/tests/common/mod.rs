//! Common test utilities and helpers

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use shiftdeck_common::sandbox::SandboxCluster;
use shiftdeck_common::view::Toast;
use shiftdeck_common::{ClusterClient, ConsoleConfig, TokenStore};

/// Token store backed by a shared map, so tests can inspect it after the
/// client takes ownership of a clone
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.save(key, value);
        store
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        self.value(key)
    }

    fn save(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

pub type TestClient = ClusterClient<SandboxCluster, MemoryTokenStore>;

/// Test environment: a seeded sandbox, shared storage and captured toasts
pub struct TestEnv {
    pub config: ConsoleConfig,
    pub storage: MemoryTokenStore,
    pub toasts: Rc<RefCell<Vec<Toast>>>,
    pub client: TestClient,
}

impl TestEnv {
    /// Signed-in client against the seeded sandbox
    pub fn new() -> Self {
        let env = Self::signed_out();
        env.client.set_token(SandboxCluster::TOKEN);
        env
    }

    pub fn signed_out() -> Self {
        Self::with_storage(MemoryTokenStore::default())
    }

    pub fn with_storage(storage: MemoryTokenStore) -> Self {
        let config = ConsoleConfig::default();
        let toasts = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&toasts);
        let client = ClusterClient::new(&config, SandboxCluster::seeded(), storage.clone())
            .with_notifier(move |toast| sink.borrow_mut().push(toast));

        TestEnv {
            config,
            storage,
            toasts,
            client,
        }
    }

    pub fn sandbox(&self) -> &SandboxCluster {
        self.client.transport()
    }
}
