pub mod api;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

pub use api::{ApiError, ApiResponse, MarathonApi};

/// One running application instance as reported by Marathon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInstance {
    pub id: String,
    pub host: String,
    #[serde(default)]
    pub ports: Vec<u16>,
}

/// Ordered result of one poll. Compared element-wise, so reordering counts as a change.
pub type Resolution = Vec<AppInstance>;

/// Body of an endpoints call. Marathon itself names the list `tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointsBody {
    #[serde(alias = "tasks", default)]
    pub instances: Vec<AppInstance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendRecord {
    pub name: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub app_id: String,
    pub backends: Vec<BackendRecord>,
    pub generation: u64,
    pub last_reconfigured: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
    pub healthy: bool,
}
