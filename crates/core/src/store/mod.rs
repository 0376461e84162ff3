//! In-memory retention store
//!
//! The store is the only shared mutable state in the service. The poller is
//! its single writer; query handlers read through [`Snapshot`]s.

pub mod retention;
pub mod snapshot;

pub use retention::{RetentionPolicy, RetentionStore, StoreStats};
pub use snapshot::Snapshot;
