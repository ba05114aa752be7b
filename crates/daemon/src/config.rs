//! Discovery configuration: parsing the daemon's JSON file and validating each
//! service's options before any watcher starts.

use common::BackendRecord;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Discovery method tag handled by this watcher.
pub const METHOD: &str = "marathon";
pub const DEFAULT_CHECK_INTERVAL: f64 = 30.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid discovery method {method:?} for service {service}")]
    InvalidMethod { service: String, method: Option<String> },
    #[error("missing or invalid app_id for service {service}")]
    MissingAppId { service: String },
    #[error("missing or invalid Marathon host for service {service}")]
    MissingHost { service: String },
    #[error("check_interval for service {service} must be a positive number of seconds, got {value}")]
    InvalidInterval { service: String, value: f64 },
    #[error("request_timeout for service {service} must be a positive number of seconds, got {value}")]
    InvalidTimeout { service: String, value: f64 },
    #[error("pass given without user for service {service}")]
    PassWithoutUser { service: String },
    #[error("service {0} is configured more than once")]
    DuplicateService(String),
    #[error("no services configured")]
    NoServices,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Raw `discovery` block, as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryOptions {
    pub method: Option<String>,
    pub app_id: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub check_interval: Option<f64>,
    pub request_timeout: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub discovery: DiscoveryOptions,
    #[serde(default)]
    pub default_servers: Vec<BackendRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// Validated settings for one watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    pub name: String,
    pub app_id: String,
    pub host: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub check_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub default_servers: Vec<BackendRecord>,
}

fn positive_secs(value: f64) -> Option<Duration> {
    (value.is_finite() && value > 0.0).then(|| Duration::from_secs_f64(value))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<WatcherConfig, ConfigError> {
        let service = self.name.clone();
        let opts = &self.discovery;

        if opts.method.as_deref() != Some(METHOD) {
            return Err(ConfigError::InvalidMethod {
                service,
                method: opts.method.clone(),
            });
        }
        let app_id = non_empty(&opts.app_id)
            .ok_or_else(|| ConfigError::MissingAppId { service: service.clone() })?
            .to_string();
        let host = non_empty(&opts.host)
            .ok_or_else(|| ConfigError::MissingHost { service: service.clone() })?
            .to_string();

        if opts.pass.is_some() && non_empty(&opts.user).is_none() {
            return Err(ConfigError::PassWithoutUser { service });
        }

        let interval = opts.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL);
        let check_interval = positive_secs(interval).ok_or_else(|| ConfigError::InvalidInterval {
            service: service.clone(),
            value: interval,
        })?;

        let request_timeout = match opts.request_timeout {
            Some(value) => Some(positive_secs(value).ok_or_else(|| {
                ConfigError::InvalidTimeout { service: service.clone(), value }
            })?),
            None => None,
        };

        Ok(WatcherConfig {
            name: service,
            app_id,
            host,
            user: opts.user.clone(),
            pass: opts.pass.clone(),
            check_interval,
            request_timeout,
            default_servers: self.default_servers.clone(),
        })
    }
}

impl FileConfig {
    /// Validates every service; the first invalid one aborts the whole set.
    pub fn validate(&self) -> Result<Vec<WatcherConfig>, ConfigError> {
        if self.services.is_empty() {
            return Err(ConfigError::NoServices);
        }

        let mut seen = HashSet::new();
        let mut configs = Vec::with_capacity(self.services.len());
        for service in &self.services {
            if !seen.insert(service.name.as_str()) {
                return Err(ConfigError::DuplicateService(service.name.clone()));
            }
            configs.push(service.validate()?);
        }
        Ok(configs)
    }
}

pub fn parse(text: &str) -> Result<Vec<WatcherConfig>, LoadError> {
    let file: FileConfig = serde_json::from_str(text)?;
    Ok(file.validate()?)
}

pub fn load(path: &Path) -> Result<Vec<WatcherConfig>, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}
