//! HTTP client for the subset of the Marathon REST API used by the watcher.

use async_trait::async_trait;
use common::{ApiError, ApiResponse, EndpointsBody, MarathonApi};
use reqwest::{header, Client, RequestBuilder, Response};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MarathonClient {
    http: Client,
    base_url: String,
    user: Option<String>,
    pass: Option<String>,
}

impl MarathonClient {
    /// `host` may omit the scheme, in which case plain http is assumed.
    /// Without a `timeout` a hung request blocks its caller indefinitely.
    pub fn new(
        host: &str,
        user: Option<String>,
        pass: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ApiError::Config("empty Marathon host".to_string()));
        }
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { http, base_url, user, pass })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let req = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json");
        match &self.user {
            Some(user) => req.basic_auth(user, self.pass.as_deref()),
            None => req,
        }
    }

    async fn send(&self, path: &str) -> Result<Response, ApiError> {
        tracing::debug!(base_url = %self.base_url, path, "marathon request");
        self.get(path)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

async fn failure<T>(resp: Response) -> ApiResponse<T> {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    ApiResponse::Failure { status, message }
}

#[async_trait]
impl MarathonApi for MarathonClient {
    async fn list(&self) -> Result<ApiResponse<()>, ApiError> {
        let resp = self.send("/v2/apps").await?;
        if resp.status().is_success() {
            Ok(ApiResponse::Success(()))
        } else {
            Ok(failure(resp).await)
        }
    }

    async fn endpoints(&self, app_id: &str) -> Result<ApiResponse<EndpointsBody>, ApiError> {
        let path = format!("/v2/apps/{}/tasks", app_id.trim_matches('/'));
        let resp = self.send(&path).await?;
        if !resp.status().is_success() {
            return Ok(failure(resp).await);
        }

        let body: EndpointsBody = resp
            .json()
            .await
            .map_err(|e| ApiError::Payload(e.to_string()))?;
        Ok(ApiResponse::Success(body))
    }
}
