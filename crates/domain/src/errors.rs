//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for RepoPulse
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RepoPulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepoPulseError {
    /// Stable label suitable for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::RateLimited(_) => "rate_limited",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for RepoPulse operations
pub type Result<T> = std::result::Result<T, RepoPulseError>;

/// Why a raw source record could not become an [`Event`](crate::Event).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The record's type tag is not one of the monitored kinds. Callers skip
    /// these silently.
    #[error("unsupported event type: {0}")]
    UnsupportedType(String),

    /// A required field is missing or cannot be parsed.
    #[error("malformed event: field `{field}` {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl ParseError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self::Malformed { field, reason: "is missing".into() }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed { field, reason: reason.into() }
    }
}
