//! # RepoPulse Domain
//!
//! Business domain types and models for RepoPulse.
//!
//! This crate contains:
//! - The event model and its parsing contract
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other RepoPulse crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod event;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use event::{parse_event, Event, EventId, EventKind, RawEvent, RepoName};
