use common::{BackendRecord, MarathonApi};
use std::sync::{Arc, RwLock};

use crate::config::WatcherConfig;

/// Published backend list. Writers swap in a whole new slice, so a reader always
/// sees one complete publication.
#[derive(Debug)]
pub struct BackendSnapshot {
    current: RwLock<Arc<[BackendRecord]>>,
}

impl BackendSnapshot {
    pub fn new() -> Self {
        Self::starting_with(Arc::from(Vec::new()))
    }

    pub fn starting_with(backends: Arc<[BackendRecord]>) -> Self {
        Self {
            current: RwLock::new(backends),
        }
    }

    pub fn load(&self) -> Arc<[BackendRecord]> {
        // A poisoned lock still guards a complete Arc, so keep serving it.
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn store(&self, backends: Arc<[BackendRecord]>) {
        match self.current.write() {
            Ok(mut guard) => *guard = backends,
            Err(poisoned) => *poisoned.into_inner() = backends,
        }
    }
}

impl Default for BackendSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a watcher keeps for its lifetime, shared between the loop and readers.
pub struct WatcherState {
    pub config: WatcherConfig,
    pub api: Arc<dyn MarathonApi>,
    /// Never mutated after start-up.
    pub default_servers: Arc<[BackendRecord]>,
    pub backends: BackendSnapshot,
}

impl WatcherState {
    /// Until the first cycle publishes, readers see the default servers.
    pub fn new(config: WatcherConfig, api: Arc<dyn MarathonApi>) -> Self {
        let default_servers: Arc<[BackendRecord]> = Arc::from(config.default_servers.clone());
        Self {
            config,
            api,
            backends: BackendSnapshot::starting_with(default_servers.clone()),
            default_servers,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }
}
