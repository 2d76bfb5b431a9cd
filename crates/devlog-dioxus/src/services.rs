use std::sync::Arc;
use std::time::Duration;

use devlog_config::Config;
use devlog_engine::backend::memory::{MemoryStorage, MemoryStore};
use devlog_engine::backend::rest::{BackendSettings, RestBackend};
use devlog_engine::debounce::DEFAULT_DEBOUNCE;
use devlog_engine::listing::DEFAULT_PAGE_SIZE;
use devlog_engine::{ObjectStorage, PostStore};

/// Backends and tuning shared by every screen, provided as root context
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn PostStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub page_size: usize,
    pub debounce: Duration,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let backend = Arc::new(RestBackend::new(BackendSettings {
            base_url: config.backend_url.clone(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
            bucket: config.bucket.clone(),
        }));
        Self {
            store: backend.clone(),
            storage: backend,
            page_size: config.page_size,
            debounce: config.debounce(),
        }
    }

    /// Everything in memory; nothing survives a restart
    pub fn offline() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            storage: Arc::new(MemoryStorage::new("memory://images")),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && Arc::ptr_eq(&self.storage, &other.storage)
    }
}
