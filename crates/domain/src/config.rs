//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_CYCLE_TIMEOUT_SECS, DEFAULT_GITHUB_API_URL,
    DEFAULT_MAX_BACKOFF_SECS, DEFAULT_MAX_EVENTS, DEFAULT_MAX_PAGES_PER_CYCLE,
    DEFAULT_PER_PAGE, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETENTION_MINUTES, DEFAULT_SHUTDOWN_GRACE_SECS, DEFAULT_USER_AGENT, MAX_PER_PAGE,
    MAX_RETENTION_MINUTES,
};
use crate::errors::{RepoPulseError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poller: PollerConfig,
    pub retention: RetentionConfig,
    pub source: SourceConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Poll loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub interval_seconds: u64,
    pub max_pages_per_cycle: u32,
    pub cycle_timeout_seconds: u64,
    pub shutdown_grace_seconds: u64,
    pub max_backoff_seconds: u64,
}

/// Retention window configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub horizon_minutes: u64,
    /// Hard cap on retained events; `None` disables the cap.
    pub max_events: Option<usize>,
}

/// Upstream event source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub per_page: u32,
    pub request_timeout_seconds: u64,
    pub max_attempts: usize,
    pub user_agent: String,
}

/// Query server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_POLL_INTERVAL_SECS,
            max_pages_per_cycle: DEFAULT_MAX_PAGES_PER_CYCLE,
            cycle_timeout_seconds: DEFAULT_CYCLE_TIMEOUT_SECS,
            shutdown_grace_seconds: DEFAULT_SHUTDOWN_GRACE_SECS,
            max_backoff_seconds: DEFAULT_MAX_BACKOFF_SECS,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { horizon_minutes: DEFAULT_RETENTION_MINUTES, max_events: Some(DEFAULT_MAX_EVENTS) }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: DEFAULT_BIND_ADDRESS.to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_seconds)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_seconds)
    }
}

impl RetentionConfig {
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::try_from(self.horizon_minutes).unwrap_or(i64::MAX / 60_000))
    }
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Config {
    /// Reject configurations the service cannot run with.
    ///
    /// This is the only process-fatal error class: everything else is
    /// recovered at runtime.
    ///
    /// # Errors
    /// Returns `RepoPulseError::Config` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_seconds == 0 {
            return Err(config_error("poller.interval_seconds must be greater than zero"));
        }
        if self.poller.max_pages_per_cycle == 0 {
            return Err(config_error("poller.max_pages_per_cycle must be greater than zero"));
        }
        if self.poller.cycle_timeout_seconds == 0 {
            return Err(config_error("poller.cycle_timeout_seconds must be greater than zero"));
        }
        if self.retention.horizon_minutes == 0 {
            return Err(config_error("retention.horizon_minutes must be greater than zero"));
        }
        if self.retention.horizon_minutes > MAX_RETENTION_MINUTES {
            return Err(config_error(&format!(
                "retention.horizon_minutes must not exceed {MAX_RETENTION_MINUTES}"
            )));
        }
        if self.retention.max_events == Some(0) {
            return Err(config_error("retention.max_events must be greater than zero when set"));
        }
        if self.source.per_page == 0 || self.source.per_page > MAX_PER_PAGE {
            return Err(config_error(&format!("source.per_page must be within 1..={MAX_PER_PAGE}")));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(config_error("source.base_url must not be empty"));
        }
        if self.server.bind_address.trim().is_empty() {
            return Err(config_error("server.bind_address must not be empty"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> RepoPulseError {
    RepoPulseError::Config(message.to_string())
}
