//! Result types produced by the metrics engine

use std::collections::BTreeMap;

use repopulse_domain::{EventKind, RepoName};
use serde::Serialize;

/// Per-kind event counts. Every monitored kind is present, zero included.
///
/// Serializes as a flat map keyed by the wire tag, e.g.
/// `{"PullRequestEvent": 1, "WatchEvent": 0, "IssuesEvent": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventCounts(BTreeMap<EventKind, u64>);

impl EventCounts {
    pub fn new() -> Self {
        Self(EventKind::ALL.into_iter().map(|kind| (kind, 0)).collect())
    }

    pub(crate) fn increment(&mut self, kind: EventKind) {
        *self.0.entry(kind).or_default() += 1;
    }

    pub fn get(&self, kind: EventKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventKind, u64)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl Default for EventCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// A repository and the number of retained events for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoCount {
    pub repo: RepoName,
    pub event_count: u64,
}
