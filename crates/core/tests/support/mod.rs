//! Shared test helpers for `repopulse-core` integration tests.
//!
//! These helpers provide reusable fixtures and a scripted event source so
//! that ingestion tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod fixtures;
pub mod source;
