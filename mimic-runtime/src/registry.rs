#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use mimic_core::{MimicConfig, MockMode};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::call::{MockId, MockRef};
use crate::interceptor::MockScope;
use crate::value::TypeToken;

static GLOBAL: OnceCell<MockRegistry> = OnceCell::new();

// Shared by every registry: ids and stamps never repeat within the process.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_STAMP: AtomicU64 = AtomicU64::new(0);

struct RegistryInner {
    config: MimicConfig,
    scopes: RwLock<HashMap<MockId, Weak<MockScope>>>,
}

/// Maps mock identities to their interceptor state and hands out order stamps.
///
/// Cheap to clone; clones share state. Entries are held weakly, so dropping
/// the last `Arc<MockScope>` unregisters the mock.
#[derive(Clone)]
pub struct MockRegistry {
    inner: Arc<RegistryInner>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::with_config(MimicConfig::default())
    }

    pub fn with_config(config: MimicConfig) -> Self {
        MockRegistry {
            inner: Arc::new(RegistryInner {
                config,
                scopes: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Installs the process-wide registry. Returns `false` if it already exists.
    pub fn init_global(config: MimicConfig) -> bool {
        GLOBAL.set(MockRegistry::with_config(config)).is_ok()
    }

    /// Process-wide registry, created from `MimicConfig::discover` on first use.
    pub fn global() -> &'static MockRegistry {
        GLOBAL.get_or_init(|| {
            let config = MimicConfig::discover().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to default mimic config");
                MimicConfig::default()
            });
            MockRegistry::with_config(config)
        })
    }

    pub fn config(&self) -> &MimicConfig {
        &self.inner.config
    }

    /// Registers a mock in the configured default mode.
    pub fn register(&self, name: &str, intercepted_types: Vec<TypeToken>) -> Arc<MockScope> {
        self.register_with_mode(name, intercepted_types, self.inner.config.default_mock_mode)
    }

    pub fn register_with_mode(
        &self,
        name: &str,
        intercepted_types: Vec<TypeToken>,
        mode: MockMode,
    ) -> Arc<MockScope> {
        let id = MockId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        let receiver = MockRef::new(id, name);
        let scope = Arc::new(MockScope::new(receiver, intercepted_types, mode, self.clone()));

        let mut scopes = self.inner.scopes.write();
        scopes.retain(|_, weak| weak.strong_count() > 0);
        scopes.insert(id, Arc::downgrade(&scope));
        drop(scopes);

        tracing::debug!(mock = name, id = id.get(), %mode, "registered mock");
        scope
    }

    pub fn resolve(&self, receiver: &MockRef) -> Option<Arc<MockScope>> {
        self.inner
            .scopes
            .read()
            .get(&receiver.id())
            .and_then(Weak::upgrade)
    }

    pub fn is_mock(&self, receiver: &MockRef) -> bool {
        self.resolve(receiver).is_some()
    }

    /// Next order stamp. Unique and strictly increasing across all callers and registries.
    pub fn next_stamp(&self) -> u64 {
        NEXT_STAMP.fetch_add(1, Ordering::SeqCst)
    }

    /// Forgets every registered mock. Stamps keep increasing so order stays global.
    pub fn reset(&self) {
        let mut scopes = self.inner.scopes.write();
        let dropped = scopes.len();
        scopes.clear();
        tracing::debug!(dropped, "reset mock registry");
    }

    pub fn len(&self) -> usize {
        self.inner
            .scopes
            .read()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
