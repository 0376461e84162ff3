//! Metrics collection modules

pub mod poller;

pub use poller::{PollerMetrics, PollerMetricsSnapshot};
