//! The polling loop that drives a [`Reconciler`] on a fixed interval.

use common::BackendRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::health;
use crate::reconciler::{Reconciler, Reconfigure};
use crate::state::WatcherState;

/// Time left in the current interval, or `None` when the cycle overran it.
pub fn remaining(interval: Duration, elapsed: Duration) -> Option<Duration> {
    interval.checked_sub(elapsed).filter(|left| !left.is_zero())
}

/// Read side of a running watcher, handed to the owning system.
#[derive(Clone)]
pub struct ServiceWatcher {
    state: Arc<WatcherState>,
    cancel: CancellationToken,
}

impl ServiceWatcher {
    /// Starts the loop on its own task. The first cycle runs immediately.
    pub fn spawn(
        state: Arc<WatcherState>,
        notifier: Arc<dyn Reconfigure>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let interval = state.config.check_interval;
        let reconciler = Reconciler::new(state.clone(), notifier);
        let handle = tokio::spawn(run(reconciler, interval, cancel.clone()));
        (Self { state, cancel }, handle)
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn app_id(&self) -> &str {
        self.state.app_id()
    }

    pub fn state(&self) -> &Arc<WatcherState> {
        &self.state
    }

    /// Currently published backends.
    pub fn backends(&self) -> Arc<[BackendRecord]> {
        self.state.backends.load()
    }

    pub async fn ping(&self) -> bool {
        health::ping(self.state.api.as_ref()).await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Runs cycles until `cancel` fires. A failed cycle is logged and the schedule
/// continues; nothing inside a cycle can end the loop.
pub async fn run(mut reconciler: Reconciler, interval: Duration, cancel: CancellationToken) {
    let service = reconciler.state().name().to_string();
    tracing::info!(
        service = %service,
        app_id = %reconciler.state().app_id(),
        interval_secs = interval.as_secs_f64(),
        "starting marathon watcher"
    );

    loop {
        let start = Instant::now();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = reconciler.run_cycle() => result,
        };
        match result {
            Ok(outcome) => tracing::debug!(service = %service, %outcome, "watcher cycle complete"),
            Err(e) => tracing::warn!(service = %service, error = %e, "error in watcher cycle"),
        }

        if let Some(wait) = remaining(interval, start.elapsed()) {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = time::sleep(wait) => {}
            }
        } else if cancel.is_cancelled() {
            break;
        }
    }

    tracing::info!(service = %service, "marathon watcher stopped");
}
