//! Change detection and backend publication for one watcher.

use common::Resolution;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::mapper::{self, MappingError};
use crate::resolver;
use crate::state::WatcherState;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotifyError(String);

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Hook of the owning system, invoked after every publication.
pub trait Reconfigure: Send + Sync {
    fn reconfigure(&self) -> Result<(), NotifyError>;
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("bad instance data: {0}")]
    Mapping(#[from] MappingError),
    #[error("reconfigure failed: {0}")]
    Notify(#[from] NotifyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Same resolution as last cycle; nothing published or notified.
    Unchanged,
    Discovered(usize),
    DefaultServers(usize),
    /// Nothing discovered and no defaults; the previous list stays published.
    Stale(usize),
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Unchanged => write!(f, "unchanged"),
            CycleOutcome::Discovered(n) => write!(f, "discovered {} backends", n),
            CycleOutcome::DefaultServers(n) => write!(f, "using {} default servers", n),
            CycleOutcome::Stale(n) => write!(f, "retained {} previous backends", n),
        }
    }
}

pub struct Reconciler {
    state: Arc<WatcherState>,
    notifier: Arc<dyn Reconfigure>,
    /// `None` until the first cycle has been applied.
    last: Option<Resolution>,
}

impl Reconciler {
    pub fn new(state: Arc<WatcherState>, notifier: Arc<dyn Reconfigure>) -> Self {
        Self {
            state,
            notifier,
            last: None,
        }
    }

    pub fn state(&self) -> &Arc<WatcherState> {
        &self.state
    }

    /// Resolve once and apply the result.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        let current = resolver::resolve(
            self.state.api.as_ref(),
            self.state.name(),
            self.state.app_id(),
        )
        .await;
        self.apply(current)
    }

    pub fn apply(&mut self, current: Resolution) -> Result<CycleOutcome, CycleError> {
        if self.last.as_ref() == Some(&current) {
            return Ok(CycleOutcome::Unchanged);
        }

        let mapped = mapper::to_backends(&current);
        // Recorded even when mapping fails, so a broken resolution is not retried
        // until Marathon reports something different.
        self.last = Some(current);
        let backends = mapped?;

        let service = self.state.name();
        let outcome = if !backends.is_empty() {
            tracing::info!(service, count = backends.len(), "discovered backends");
            let count = backends.len();
            self.state.backends.store(Arc::from(backends));
            CycleOutcome::Discovered(count)
        } else if !self.state.default_servers.is_empty() {
            let defaults = self.state.default_servers.clone();
            tracing::warn!(service, default_servers = ?defaults, "no backends; using default servers");
            let count = defaults.len();
            self.state.backends.store(defaults);
            CycleOutcome::DefaultServers(count)
        } else {
            let previous = self.state.backends.load();
            tracing::warn!(service, backends = ?previous, "no backends and no default servers; using previous backends");
            CycleOutcome::Stale(previous.len())
        };

        self.notifier.reconfigure()?;
        Ok(outcome)
    }
}
