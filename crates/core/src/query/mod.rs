//! Query layer
//!
//! Validates caller-supplied parameters, takes a store snapshot, and runs the
//! metrics engine over it. Front ends (HTTP routes, tests) only see the
//! response DTOs and [`QueryError`].

pub mod error;
pub mod params;
pub mod service;

pub use error::QueryError;
pub use service::{PrAverageResponse, QueryService, ReposResponse, SampleEventsResponse};
