//! Bounded, deduplicating event store
//!
//! ## Design
//! - **Ordering**: events are keyed by `(created_at, insertion sequence)` in a
//!   `BTreeMap`, so iteration order is the snapshot order and oldest-first
//!   eviction is a range split.
//! - **Deduplication**: a side index maps every retained id to its key.
//! - **Locking**: one `parking_lot::RwLock` guards both maps. Writers hold it
//!   only for a single insert or split; readers copy out and release. The lock
//!   is never held across an `.await`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use repopulse_domain::{Event, EventId, RetentionConfig};
use serde::Serialize;
use tracing::debug;

use super::snapshot::Snapshot;

type OrderKey = (DateTime<Utc>, u64);

/// How long events are kept, and an optional hard cap on their number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub horizon: Duration,
    pub max_events: Option<usize>,
}

impl RetentionPolicy {
    pub fn new(horizon: Duration) -> Self {
        Self { horizon, max_events: None }
    }

    #[must_use]
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = Some(max_events);
        self
    }
}

impl From<&RetentionConfig> for RetentionPolicy {
    fn from(config: &RetentionConfig) -> Self {
        Self { horizon: config.horizon(), max_events: config.max_events }
    }
}

/// Summary used by health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub size: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct StoreState {
    events: BTreeMap<OrderKey, Event>,
    index: HashMap<EventId, OrderKey>,
    next_seq: u64,
}

impl StoreState {
    fn pop_oldest(&mut self) -> Option<Event> {
        let (_, event) = self.events.pop_first()?;
        self.index.remove(&event.id);
        Some(event)
    }
}

/// Concurrency-safe store holding the recent event window.
#[derive(Debug)]
pub struct RetentionStore {
    state: RwLock<StoreState>,
    policy: RetentionPolicy,
}

impl RetentionStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { state: RwLock::new(StoreState::default()), policy }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Insert `event` unless an event with the same id is already retained.
    ///
    /// Returns `true` when the event was newly inserted. When the hard cap is
    /// reached the oldest event is evicted to make room; an incoming event
    /// older than everything retained is the oldest itself and is rejected.
    pub fn append(&self, event: Event) -> bool {
        let mut state = self.state.write();

        if state.index.contains_key(&event.id) {
            return false;
        }

        if let Some(cap) = self.policy.max_events {
            if state.events.len() >= cap {
                let oldest = state.events.first_key_value().map(|((created_at, _), _)| *created_at);
                if oldest.is_some_and(|oldest| event.created_at < oldest) {
                    debug!(id = %event.id, "store at capacity; rejecting event older than window");
                    return false;
                }
                while state.events.len() >= cap {
                    if state.pop_oldest().is_none() {
                        break;
                    }
                }
            }
        }

        let key = (event.created_at, state.next_seq);
        state.next_seq += 1;
        state.index.insert(event.id.clone(), key);
        state.events.insert(key, event);
        true
    }

    /// Consistent copy of every retained event in store order.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot::new(state.events.values().cloned().collect())
    }

    /// Drop events older than the retention horizon relative to `now`.
    ///
    /// Events exactly at the cutoff are kept. Returns the number removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        // A horizon reaching past the calendar's start expires nothing.
        let Some(cutoff) = now.checked_sub_signed(self.policy.horizon) else {
            return 0;
        };
        let mut state = self.state.write();

        let retained = state.events.split_off(&(cutoff, 0));
        let expired = std::mem::replace(&mut state.events, retained);
        for event in expired.values() {
            state.index.remove(&event.id);
        }

        if !expired.is_empty() {
            debug!(evicted = expired.len(), %cutoff, "evicted expired events");
        }
        expired.len()
    }

    /// Number of retained events.
    pub fn size(&self) -> usize {
        self.state.read().events.len()
    }

    /// The first `limit` events in store order.
    pub fn sample(&self, limit: usize) -> Vec<Event> {
        let state = self.state.read();
        state.events.values().take(limit).cloned().collect()
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        StoreStats {
            size: state.events.len(),
            oldest: state.events.first_key_value().map(|((created_at, _), _)| *created_at),
            newest: state.events.last_key_value().map(|((created_at, _), _)| *created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use repopulse_domain::{EventKind, RepoName};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn event(id: &str, offset_secs: i64) -> Event {
        Event::new(
            EventId::new(id),
            EventKind::Watch,
            RepoName::new("octo/widgets").unwrap(),
            t0() + Duration::seconds(offset_secs),
        )
    }

    fn store() -> RetentionStore {
        RetentionStore::new(RetentionPolicy::new(Duration::minutes(10)))
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let store = store();
        assert!(store.append(event("a", 0)));
        assert!(!store.append(event("a", 5)));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn snapshot_is_sorted_with_insertion_order_ties() {
        let store = store();
        store.append(event("late", 30));
        store.append(event("tie-1", 10));
        store.append(event("early", 0));
        store.append(event("tie-2", 10));

        let ids: Vec<_> = store.snapshot().iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, ["early", "tie-1", "tie-2", "late"]);
    }

    #[test]
    fn evict_expired_removes_only_events_past_horizon() {
        let store = store();
        store.append(event("old", 0));
        store.append(event("edge", 60));
        store.append(event("new", 600));

        // cutoff = t0 + 60s
        let removed = store.evict_expired(t0() + Duration::seconds(660));
        assert_eq!(removed, 1);

        let ids: Vec<_> = store.snapshot().iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, ["edge", "new"]);
    }

    #[test]
    fn horizon_past_calendar_range_expires_nothing() {
        let store = RetentionStore::new(RetentionPolicy::new(Duration::days(100_000_000)));
        store.append(event("old", 0));

        assert_eq!(store.evict_expired(t0() + Duration::days(365)), 0);
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn evicted_ids_can_be_ingested_again() {
        let store = store();
        store.append(event("a", 0));
        store.evict_expired(t0() + Duration::hours(1));
        assert_eq!(store.size(), 0);
        assert!(store.append(event("a", 3_600)));
    }

    #[test]
    fn hard_cap_evicts_oldest_first() {
        let store =
            RetentionStore::new(RetentionPolicy::new(Duration::minutes(10)).with_max_events(2));
        store.append(event("a", 0));
        store.append(event("b", 10));
        assert!(store.append(event("c", 20)));

        let ids: Vec<_> = store.snapshot().iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn hard_cap_rejects_event_older_than_window() {
        let store =
            RetentionStore::new(RetentionPolicy::new(Duration::minutes(10)).with_max_events(2));
        store.append(event("b", 10));
        store.append(event("c", 20));
        assert!(!store.append(event("a", 0)));
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn sample_and_stats_follow_store_order() {
        let store = store();
        assert_eq!(store.stats(), StoreStats { size: 0, oldest: None, newest: None });

        for (idx, offset) in [40, 10, 30, 20].into_iter().enumerate() {
            store.append(event(&format!("e{idx}"), offset));
        }

        let sample: Vec<_> = store.sample(2).into_iter().map(|e| e.id.to_string()).collect();
        assert_eq!(sample, ["e1", "e3"]);

        let stats = store.stats();
        assert_eq!(stats.size, 4);
        assert_eq!(stats.oldest, Some(t0() + Duration::seconds(10)));
        assert_eq!(stats.newest, Some(t0() + Duration::seconds(40)));
    }
}
