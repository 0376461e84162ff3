//! Health reporting for the running service
//!
//! A [`HealthStatus`] aggregates per-component checks into a score. The
//! `/health` route answers 200 when the status is healthy and 503 otherwise.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Share of healthy components required for the service to count as healthy.
pub const HEALTHY_THRESHOLD: f64 = 0.8;

/// Overall health status of the service
///
/// # Example
/// ```
/// use chrono::Utc;
/// use repopulse_api::utils::health::{ComponentHealth, HealthStatus};
///
/// let mut status = HealthStatus::new(Utc::now())
///     .add_component(ComponentHealth::healthy("store"))
///     .add_component(ComponentHealth::unhealthy("scheduler", "not running"));
/// status.calculate_score();
///
/// assert_eq!(status.score, 0.5);
/// assert!(!status.is_healthy);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub is_healthy: bool,

    /// Healthy components divided by total components, 1.0 when empty
    pub score: f64,

    pub components: Vec<ComponentHealth>,

    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { is_healthy: true, score: 1.0, components: Vec::new(), timestamp }
    }

    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Recompute `score` and `is_healthy` from the components.
    ///
    /// Call after all components have been added.
    pub fn calculate_score(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let healthy_count = self.components.iter().filter(|c| c.is_healthy).count();

        self.score = healthy_count as f64 / self.components.len() as f64;
        self.is_healthy = self.score >= HEALTHY_THRESHOLD;
    }
}

/// Health of an individual component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    /// Component identifier ("scheduler", "source", "store")
    pub name: String,

    pub is_healthy: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    /// Healthy, with a note worth surfacing.
    pub fn healthy_with(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: Some(message.into()) }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}
