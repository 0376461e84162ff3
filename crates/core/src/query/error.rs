//! Query parameter errors

use thiserror::Error;

/// A caller supplied a missing or unusable parameter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Please provide {0} parameter")]
    MissingParameter(&'static str),

    #[error("Invalid {name} parameter `{value}`: {reason}")]
    InvalidParameter { name: &'static str, value: String, reason: String },
}

impl QueryError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter { name, value: value.into(), reason: reason.into() }
    }

    /// Stable machine-readable code for response bodies.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "missing_parameter",
            Self::InvalidParameter { .. } => "invalid_parameter",
        }
    }
}
