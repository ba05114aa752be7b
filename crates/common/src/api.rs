use async_trait::async_trait;
use thiserror::Error;

use crate::EndpointsBody;

/// A completed call to the orchestrator API.
///
/// `Failure` means the server answered with a non-2xx status; transport and decoding
/// problems are reported as [`ApiError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure { status: u16, message: String },
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed response payload: {0}")]
    Payload(String),
}

/// The two Marathon operations the watcher depends on.
#[async_trait]
pub trait MarathonApi: Send + Sync {
    /// Lightweight call used as a liveness probe.
    async fn list(&self) -> Result<ApiResponse<()>, ApiError>;

    /// Running instances of one application.
    async fn endpoints(&self, app_id: &str) -> Result<ApiResponse<EndpointsBody>, ApiError>;
}
