//! Scheduler error types

use repopulse_domain::RepoPulseError;
use thiserror::Error;
use tokio::task::JoinError;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// Operation timed out
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<JoinError> for SchedulerError {
    fn from(err: JoinError) -> Self {
        SchedulerError::TaskJoinFailed(err.to_string())
    }
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let domain_err = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                RepoPulseError::InvalidInput(err.to_string())
            }
            _ => RepoPulseError::Internal(err.to_string()),
        };
        InfraError(domain_err)
    }
}

impl From<SchedulerError> for RepoPulseError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
