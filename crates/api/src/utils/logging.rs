use std::time::Duration;

use repopulse_domain::LoggingConfig;
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Build the level filter: `RUST_LOG` wins, then `logging.level`.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|source| LoggingError::Filter { directive: config.level.clone(), source })
}

/// Install the global subscriber. Call once, from the binary.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let registry = tracing_subscriber::registry().with(env_filter(config)?);

    if config.json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true).with_line_number(true)).try_init()?;
    }
    Ok(())
}

/// Log the outcome of a route invocation with structured fields.
///
/// `route` should be the matched path, never the raw query string.
#[inline]
pub fn log_request(route: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        debug!(route, duration_ms, "request_success");
    } else {
        warn!(route, duration_ms, "request_rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { level: "repopulse=loud".to_string(), json: false };
        assert!(matches!(env_filter(&config), Err(LoggingError::Filter { .. })));
    }

    #[test]
    fn accepts_configured_level() {
        let config = LoggingConfig { level: "repopulse_core=debug,info".to_string(), json: true };
        assert!(env_filter(&config).is_ok());
    }
}
