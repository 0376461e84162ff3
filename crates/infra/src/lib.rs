//! # RepoPulse Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client with retry support
//! - The GitHub events integration
//! - The poll scheduler and its metrics
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `repopulse-core`
//! - Depends on `repopulse-domain` and `repopulse-core`
//! - Contains all "impure" code (network I/O, timers, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::github::GitHubEventSource;
pub use observability::metrics::{PollerMetrics, PollerMetricsSnapshot};
pub use scheduling::{PollScheduler, PollSchedulerConfig, SchedulerError, SchedulerResult};
