//! GitHub public events feed
//!
//! Implements the core [`EventSource`](repopulse_core::EventSource) port on
//! top of `GET /events`, with conditional requests and rate-limit handling.

pub mod client;
pub mod cursor;
pub mod headers;

pub use client::GitHubEventSource;
pub use cursor::PageCursor;
