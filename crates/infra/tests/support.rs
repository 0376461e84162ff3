//! Shared helpers for infra integration tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use repopulse_core::{ManualClock, Poller, PollerSettings, RetentionPolicy, RetentionStore};
use repopulse_infra::http::HttpClient;
use repopulse_infra::integrations::github::GitHubEventSource;
use serde_json::{json, Value};

/// Fixed "now" shared by fixtures and the manual clock.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A GitHub event object as returned by `GET /events`.
pub fn github_event(id: &str, kind: &str, repo: &str, minutes_ago: i64) -> Value {
    let created_at = now() - chrono::Duration::minutes(minutes_ago);
    json!({
        "id": id,
        "type": kind,
        "actor": { "id": 1, "login": "octocat" },
        "repo": { "id": 42, "name": repo, "url": format!("https://api.github.com/repos/{repo}") },
        "payload": {},
        "public": true,
        "created_at": created_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    })
}

/// Poller wired to a GitHub source pointed at `base_url`.
pub fn github_poller(base_url: &str, max_pages: u32) -> Poller {
    let http_client = HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .max_attempts(1)
        .build()
        .expect("http client");
    let source = Arc::new(GitHubEventSource::new(http_client, base_url, 100));
    let store = Arc::new(RetentionStore::new(RetentionPolicy::new(chrono::Duration::minutes(120))));

    Poller::new(
        source,
        store,
        Arc::new(ManualClock::new(now())),
        PollerSettings { max_pages_per_cycle: max_pages },
    )
}
