//! Event ingestion
//!
//! [`ports`] defines the upstream boundary; [`poller`] runs a single
//! fetch-parse-append cycle against it.

pub mod poller;
pub mod ports;

pub use poller::{CycleFailure, CycleReport, CycleStats, Poller, PollerSettings, StopReason};
pub use ports::{Cursor, EventSource, FetchError, FetchPage, RateLimitInfo};
