//! Port interfaces for event ingestion
//!
//! These traits define the boundary between the poll cycle and whichever
//! upstream feed is plugged in.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use repopulse_domain::{RawEvent, RepoPulseError};
use thiserror::Error;

/// Opaque pagination token understood only by the source that issued it.
///
/// The default cursor means "start from the newest page with no prior state".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cursor(Option<String>);

impl Cursor {
    pub fn start() -> Self {
        Self(None)
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_start(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(token) => f.write_str(token),
            None => f.write_str("<start>"),
        }
    }
}

/// Rate-limit metadata reported alongside a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
    /// Minimum polling interval the source asks clients to respect.
    pub poll_interval: Option<Duration>,
}

impl RateLimitInfo {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// One page of raw records.
#[derive(Debug, Clone, Default)]
pub struct FetchPage {
    /// Records in source order. Empty when the source has nothing new.
    pub records: Vec<RawEvent>,
    /// Cursor for the following page in this cycle, `None` once exhausted.
    pub next_page: Option<Cursor>,
    /// Where the next cycle should start if paging stops after this page.
    pub resume_from: Cursor,
    pub rate_limit: Option<RateLimitInfo>,
}

/// Failures fetching from the upstream source. Recovered per cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("rate limit exhausted")]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("source reported an error: {message}")]
    Api { message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Stable label suitable for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::RateLimited { .. } => "rate_limited",
            Self::Api { .. } => "api",
            Self::Malformed(_) => "malformed",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl From<RepoPulseError> for FetchError {
    fn from(err: RepoPulseError) -> Self {
        match err {
            RepoPulseError::Network(message) => Self::Network(message),
            RepoPulseError::RateLimited(_) => Self::RateLimited { reset_at: None },
            other => Self::Api { message: other.to_string() },
        }
    }
}

impl From<FetchError> for RepoPulseError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(_) | FetchError::Timeout(_) => Self::Network(err.to_string()),
            FetchError::RateLimited { .. } => Self::RateLimited(err.to_string()),
            FetchError::Http { .. } | FetchError::Api { .. } | FetchError::Malformed(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

/// Upstream feed of raw events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the page addressed by `cursor`.
    async fn fetch_page(&self, cursor: &Cursor) -> Result<FetchPage, FetchError>;
}
