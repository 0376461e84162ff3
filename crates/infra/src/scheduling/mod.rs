//! Scheduling infrastructure for the poll loop
//!
//! The scheduler follows the runtime rules used across this crate:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations
//! - Structured tracing with metrics integration

pub mod error;
pub mod poll_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use poll_scheduler::{PollScheduler, PollSchedulerConfig};
