//! Event and raw-record builders

use chrono::{DateTime, Duration, TimeZone, Utc};
use repopulse_domain::{Event, EventId, EventKind, RawEvent, RepoName};

/// Fixed reference instant used across tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn at_secs(offset: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(offset)
}

pub fn event(id: &str, kind: EventKind, repo: &str, created_at: DateTime<Utc>) -> Event {
    Event::new(EventId::new(id), kind, RepoName::new(repo).unwrap(), created_at)
}

pub fn raw(id: &str, tag: &str, repo: &str, created_at: DateTime<Utc>) -> RawEvent {
    RawEvent {
        id: Some(id.to_string()),
        kind: Some(tag.to_string()),
        repo: Some(repo.to_string()),
        created_at: Some(created_at.to_rfc3339()),
    }
}
