//! Point-in-time copy of the store contents

use std::ops::Deref;

use chrono::{DateTime, Utc};
use repopulse_domain::Event;

/// Immutable, owned copy of the retained events.
///
/// Events are ordered by `created_at` ascending, ties in insertion order.
/// Holding a snapshot never blocks the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    events: Vec<Event>,
}

impl Snapshot {
    pub(crate) fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Build a snapshot from arbitrary events, sorting them into store order.
    ///
    /// Mostly useful for feeding the metrics functions in tests and benches.
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by_key(|event| event.created_at);
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(|event| event.created_at)
    }

    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(|event| event.created_at)
    }

    pub fn into_vec(self) -> Vec<Event> {
        self.events
    }
}

impl Deref for Snapshot {
    type Target = [Event];

    fn deref(&self) -> &Self::Target {
        &self.events
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
