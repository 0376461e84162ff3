//! Query service - read path over the retention store

use std::sync::Arc;

use repopulse_domain::constants::DEBUG_SAMPLE_SIZE;
use repopulse_domain::{Event, RepoName};
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::QueryError;
use super::params;
use crate::clock::Clock;
use crate::metrics::{self, EventCounts, RepoCount};
use crate::store::{RetentionStore, StoreStats};

const NOT_ENOUGH_PR_EVENTS: &str = "Not enough PR events yet";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReposResponse {
    pub repos: Vec<RepoName>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrAverageResponse {
    pub repo: RepoName,
    pub average_time_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleEventsResponse {
    pub sample_events: Vec<Event>,
}

/// Answers metric queries against the current store contents.
///
/// Each call works on its own snapshot, so a response is internally
/// consistent even while the poller keeps appending.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<RetentionStore>,
    clock: Arc<dyn Clock>,
}

impl QueryService {
    pub fn new(store: Arc<RetentionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn repos(&self) -> ReposResponse {
        let snapshot = self.store.snapshot();
        ReposResponse { repos: metrics::list_repos(&snapshot).into_iter().collect() }
    }

    /// Unknown repos and repos with fewer than two PR events yield a null
    /// average with an explanatory message.
    #[instrument(skip(self))]
    pub fn pr_average(&self, repo: Option<&str>) -> Result<PrAverageResponse, QueryError> {
        let repo = params::repo(repo)?;
        let snapshot = self.store.snapshot();

        let average = metrics::pr_average_interval(&snapshot, &repo);
        debug!(%repo, ?average, events = snapshot.len(), "computed PR average");

        Ok(match average {
            Some(interval) => PrAverageResponse {
                repo,
                average_time_seconds: Some(interval.as_secs_f64()),
                message: None,
            },
            None => PrAverageResponse {
                repo,
                average_time_seconds: None,
                message: Some(NOT_ENOUGH_PR_EVENTS.to_string()),
            },
        })
    }

    #[instrument(skip(self))]
    pub fn events_count(&self, offset: Option<&str>) -> Result<EventCounts, QueryError> {
        let offset = params::offset(offset)?;
        let snapshot = self.store.snapshot();
        Ok(metrics::events_count_by_type(&snapshot, offset, self.clock.now()))
    }

    #[instrument(skip(self))]
    pub fn top_repos(&self, n: Option<&str>) -> Result<Vec<RepoCount>, QueryError> {
        let n = params::top_n(n)?;
        let snapshot = self.store.snapshot();
        Ok(metrics::top_n_repos(&snapshot, n))
    }

    pub fn sample_events(&self) -> SampleEventsResponse {
        SampleEventsResponse { sample_events: self.store.sample(DEBUG_SAMPLE_SIZE) }
    }

    pub fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }
}
