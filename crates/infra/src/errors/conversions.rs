//! Conversions from external infrastructure errors into domain errors.

use repopulse_domain::RepoPulseError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RepoPulseError);

impl From<InfraError> for RepoPulseError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RepoPulseError> for InfraError {
    fn from(value: RepoPulseError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRepoPulseError {
    fn into_repopulse(self) -> RepoPulseError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RepoPulseError */
/* -------------------------------------------------------------------------- */

impl IntoRepoPulseError for HttpError {
    fn into_repopulse(self) -> RepoPulseError {
        if self.is_timeout() {
            return RepoPulseError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return RepoPulseError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 => RepoPulseError::Config(format!("{message}: check GITHUB_TOKEN")),
                404 => RepoPulseError::NotFound(message),
                429 => RepoPulseError::RateLimited(message),
                400..=499 => RepoPulseError::InvalidInput(message),
                _ => RepoPulseError::Network(message),
            };
        }

        if self.is_decode() {
            return RepoPulseError::Internal(format!("failed to decode response body: {self}"));
        }

        RepoPulseError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_repopulse())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
