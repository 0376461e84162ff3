//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use repopulse_api::AppContext;
use repopulse_core::{Cursor, EventSource, FetchError, FetchPage, ManualClock};
use repopulse_domain::{Config, Event, EventId, EventKind, RepoName};
use serde_json::Value;
use tower::ServiceExt;

/// Fixed "now" for route tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn event(id: &str, kind: EventKind, repo: &str, minutes_ago: i64) -> Event {
    Event::new(
        EventId::new(id),
        kind,
        RepoName::new(repo).unwrap(),
        t0() - Duration::minutes(minutes_ago),
    )
}

/// Source that never has anything new.
pub struct IdleSource;

#[async_trait]
impl EventSource for IdleSource {
    async fn fetch_page(&self, _cursor: &Cursor) -> Result<FetchPage, FetchError> {
        Ok(FetchPage::default())
    }
}

/// Context pinned at [`t0`] whose store already holds `events`.
pub fn seeded_context(events: Vec<Event>) -> Arc<AppContext> {
    let ctx = AppContext::with_source(
        Config::default(),
        Arc::new(IdleSource),
        Arc::new(ManualClock::new(t0())),
    );
    for event in events {
        ctx.store.append(event);
    }
    Arc::new(ctx)
}

/// Issue a GET against `app` and decode the JSON body.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
