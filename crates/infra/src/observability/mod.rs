//! Observability infrastructure for poller metrics
//!
//! Counters are plain atomics shared between the poll task and the health
//! endpoint; logging itself goes through `tracing`.
//!
//! ## Design Principles
//!
//! 1. **Future-Proof Returns**: All record methods return `MetricsResult<()>`
//!    so limits or validation can be added without API breakage. They
//!    currently always succeed.
//!
//! 2. **Memory Ordering**: SeqCst for values combined into derived metrics
//!    (averages), Relaxed for independent counters.
//!
//! ## Error Handling
//!
//! ```rust
//! use repopulse_infra::observability::metrics::PollerMetrics;
//!
//! let metrics = PollerMetrics::new();
//!
//! if let Err(e) = metrics.record_rate_limited() {
//!     tracing::warn!("Failed to record metric: {}", e);
//! }
//! ```

pub mod metrics;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "average")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
