//! Marathon service watcher: polls Marathon for the instances of an application,
//! publishes them as load-balancer backends and notifies the owner on change.

pub mod config;
pub mod health;
pub mod mapper;
pub mod reconciler;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod state;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, LoadError, WatcherConfig};
pub use reconciler::{CycleError, CycleOutcome, NotifyError, Reconciler, Reconfigure};
pub use registry::ServiceRegistry;
pub use watcher::ServiceWatcher;
