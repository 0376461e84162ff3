//! Metric computations
//!
//! Every function accepts events in any order and is deterministic for a
//! given input.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use repopulse_domain::{Event, EventKind, RepoName};

use super::types::{EventCounts, RepoCount};

/// Distinct repositories with at least one retained event, sorted.
pub fn list_repos(events: &[Event]) -> BTreeSet<RepoName> {
    events.iter().map(|event| event.repo.clone()).collect()
}

/// Mean time between consecutive pull request events for `repo`.
///
/// `None` when the repo has fewer than two PR events. Input order does not
/// matter; the PR timestamps are sorted before the gaps are taken.
pub fn pr_average_interval(events: &[Event], repo: &RepoName) -> Option<Duration> {
    let mut opened: Vec<DateTime<Utc>> = events
        .iter()
        .filter(|event| event.kind == EventKind::PullRequest && &event.repo == repo)
        .map(|event| event.created_at)
        .collect();
    if opened.len() < 2 {
        return None;
    }
    opened.sort_unstable();

    let total: Duration =
        opened.windows(2).map(|pair| (pair[1] - pair[0]).to_std().unwrap_or_default()).sum();
    let gaps = u32::try_from(opened.len() - 1).unwrap_or(u32::MAX);
    Some(total / gaps)
}

/// Count events per kind created at or after `now - offset`.
///
/// An offset reaching past the earliest representable instant counts every
/// event.
pub fn events_count_by_type(
    events: &[Event],
    offset: chrono::Duration,
    now: DateTime<Utc>,
) -> EventCounts {
    let cutoff = now.checked_sub_signed(offset);

    let mut counts = EventCounts::new();
    for event in events {
        if cutoff.map_or(true, |cutoff| event.created_at >= cutoff) {
            counts.increment(event.kind);
        }
    }
    counts
}

/// The `n` repositories with the most retained events.
///
/// Sorted by count descending, ties by repo name ascending. `n <= 0` yields
/// an empty list.
pub fn top_n_repos(events: &[Event], n: i64) -> Vec<RepoCount> {
    let Ok(limit) = usize::try_from(n) else {
        return Vec::new();
    };
    if limit == 0 {
        return Vec::new();
    }

    let mut per_repo: HashMap<&RepoName, u64> = HashMap::new();
    for event in events {
        *per_repo.entry(&event.repo).or_default() += 1;
    }

    let mut ranked: Vec<RepoCount> = per_repo
        .into_iter()
        .map(|(repo, event_count)| RepoCount { repo: repo.clone(), event_count })
        .collect();
    ranked.sort_by(|a, b| b.event_count.cmp(&a.event_count).then_with(|| a.repo.cmp(&b.repo)));
    ranked.truncate(limit);
    ranked
}
