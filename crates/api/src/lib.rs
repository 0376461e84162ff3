//! # RepoPulse API
//!
//! HTTP front end and process wiring.
//!
//! This crate contains:
//! - Axum routes exposing the metric queries, a diagnostic sample and `/health`
//! - Application context (dependency injection)
//! - Logging initialisation and the `repopulse` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use routes::{router, ApiError};
