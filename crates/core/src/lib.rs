//! # RepoPulse Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The retention store and its eviction policy
//! - The poll cycle and the event source port it drives
//! - The metrics engine and the query service on top of it
//!
//! ## Architecture Principles
//! - Only depends on `repopulse-domain`
//! - No HTTP or platform code
//! - The upstream feed is reached through the [`EventSource`] trait
//! - Pure, testable business logic

pub mod clock;
pub mod ingest;
pub mod metrics;
pub mod query;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ingest::{
    Cursor, CycleFailure, CycleReport, CycleStats, EventSource, FetchError, FetchPage, Poller,
    PollerSettings, RateLimitInfo, StopReason,
};
pub use metrics::{EventCounts, RepoCount};
pub use query::{QueryError, QueryService};
pub use store::{RetentionPolicy, RetentionStore, Snapshot, StoreStats};
