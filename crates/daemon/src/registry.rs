//! The owning side of the watchers: starts one per configured service, receives
//! their reconfigure notifications and answers status queries.

use chrono::{DateTime, Utc};
use common::{ApiError, MarathonApi, ServiceStatus};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::WatcherConfig;
use crate::reconciler::{NotifyError, Reconfigure};
use crate::state::WatcherState;
use crate::watcher::ServiceWatcher;

/// Counts reconfigurations of one service.
pub struct ReconfigureTracker {
    state: Arc<WatcherState>,
    generation: AtomicU64,
    last_reconfigured: RwLock<Option<DateTime<Utc>>>,
}

impl ReconfigureTracker {
    pub fn new(state: Arc<WatcherState>) -> Self {
        Self {
            state,
            generation: AtomicU64::new(0),
            last_reconfigured: RwLock::new(None),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn last_reconfigured(&self) -> Option<DateTime<Utc>> {
        match self.last_reconfigured.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Reconfigure for ReconfigureTracker {
    fn reconfigure(&self) -> Result<(), NotifyError> {
        let backends = self.state.backends.load();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Some(Utc::now());
        match self.last_reconfigured.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }

        tracing::info!(
            service = %self.state.name(),
            generation,
            count = backends.len(),
            backends = ?backends,
            "reconfigured"
        );
        Ok(())
    }
}

struct ServiceEntry {
    watcher: ServiceWatcher,
    tracker: Arc<ReconfigureTracker>,
}

pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    /// Spawns a watcher per config, each on a child of `cancel`. `connect` builds the
    /// API client for a service; a failure there aborts start-up before any
    /// watcher is spawned.
    pub fn start<F>(
        configs: Vec<WatcherConfig>,
        mut connect: F,
        cancel: &CancellationToken,
    ) -> Result<(Self, Vec<JoinHandle<()>>), ApiError>
    where
        F: FnMut(&WatcherConfig) -> Result<Arc<dyn MarathonApi>, ApiError>,
    {
        let mut states = Vec::with_capacity(configs.len());
        for config in configs {
            let api = connect(&config)?;
            states.push(Arc::new(WatcherState::new(config, api)));
        }

        let mut services = BTreeMap::new();
        let mut handles = Vec::with_capacity(states.len());
        for state in states {
            let tracker = Arc::new(ReconfigureTracker::new(state.clone()));
            let (watcher, handle) =
                ServiceWatcher::spawn(state, tracker.clone(), cancel.child_token());
            services.insert(watcher.name().to_string(), ServiceEntry { watcher, tracker });
            handles.push(handle);
        }

        Ok((Self { services }, handles))
    }

    pub fn watcher(&self, name: &str) -> Option<&ServiceWatcher> {
        self.services.get(name).map(|entry| &entry.watcher)
    }

    pub fn status(&self, name: &str) -> Option<ServiceStatus> {
        self.services.get(name).map(|entry| ServiceStatus {
            name: entry.watcher.name().to_string(),
            app_id: entry.watcher.app_id().to_string(),
            backends: entry.watcher.backends().to_vec(),
            generation: entry.tracker.generation(),
            last_reconfigured: entry.tracker.last_reconfigured(),
        })
    }

    /// All services, ordered by name.
    pub fn statuses(&self) -> Vec<ServiceStatus> {
        self.services.keys().filter_map(|name| self.status(name)).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
