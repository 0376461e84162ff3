//! Metrics over retained events
//!
//! Pure functions over a slice of events. They never touch
//! the store directly, so callers decide which snapshot they run against.

pub mod engine;
pub mod types;

pub use engine::{events_count_by_type, list_repos, pr_average_interval, top_n_repos};
pub use types::{EventCounts, RepoCount};
