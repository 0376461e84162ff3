//! HTTP routes
//!
//! Every metrics handler reads a fresh store snapshot through the
//! [`QueryService`](repopulse_core::QueryService). Bad parameters come back as
//! 400 with `{"error": message, "code": label}`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use repopulse_core::{QueryError, StoreStats};
use repopulse_infra::PollerMetricsSnapshot;
use serde::Serialize;
use thiserror::Error;

use crate::context::AppContext;
use crate::utils::health::HealthStatus;
use crate::utils::logging::log_request;

type Params = Query<HashMap<String, String>>;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Query(err) => (StatusCode::BAD_REQUEST, err.label()),
        };
        (status, Json(ErrorBody { error: self.to_string(), code })).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    health: HealthStatus,
    store: StoreStats,
    poller: PollerMetricsSnapshot,
}

pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/metrics/repos", get(repos))
        .route("/metrics/pr_average", get(pr_average))
        .route("/metrics/events_count", get(events_count))
        .route("/metrics/top_repos", get(top_repos))
        .route("/debug/events", get(debug_events))
        .route("/health", get(health))
        .with_state(context)
}

/// Time `handler` and log its outcome under `route`.
fn observed<T>(route: &str, handler: impl FnOnce() -> Result<T, QueryError>) -> Result<T, ApiError> {
    let started = Instant::now();
    let result = handler();
    log_request(route, started.elapsed(), result.is_ok());
    Ok(result?)
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

async fn repos(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    let started = Instant::now();
    let body = ctx.query.repos();
    log_request("/metrics/repos", started.elapsed(), true);
    Json(body)
}

async fn pr_average(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Params,
) -> Result<impl IntoResponse, ApiError> {
    let body = observed("/metrics/pr_average", || ctx.query.pr_average(param(&params, "repo")))?;
    Ok(Json(body))
}

async fn events_count(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Params,
) -> Result<impl IntoResponse, ApiError> {
    let body =
        observed("/metrics/events_count", || ctx.query.events_count(param(&params, "offset")))?;
    Ok(Json(body))
}

async fn top_repos(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Params,
) -> Result<impl IntoResponse, ApiError> {
    let body = observed("/metrics/top_repos", || ctx.query.top_repos(param(&params, "n")))?;
    Ok(Json(body))
}

async fn debug_events(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    Json(ctx.query.sample_events())
}

async fn health(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    let health = ctx.health_check().await;
    let status = if health.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let body = HealthResponse {
        status: if health.is_healthy { "ok" } else { "degraded" },
        health,
        store: ctx.query.store_stats(),
        poller: ctx.metrics.snapshot(),
    };
    (status, Json(body))
}
