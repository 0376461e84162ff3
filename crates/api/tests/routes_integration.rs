//! Route-level tests: parameter handling, status codes and response shapes.

mod support;

use axum::http::StatusCode;
use repopulse_api::router;
use repopulse_domain::EventKind;
use serde_json::json;
use support::{event, get_json, seeded_context};

fn fixture() -> Vec<repopulse_domain::Event> {
    vec![
        event("1", EventKind::PullRequest, "octo/widgets", 30),
        event("2", EventKind::Watch, "octo/gadgets", 15),
        event("3", EventKind::PullRequest, "octo/widgets", 20),
        event("4", EventKind::Issues, "octo/widgets", 9),
        event("5", EventKind::PullRequest, "octo/widgets", 5),
        event("6", EventKind::Watch, "acme/rockets", 2),
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn repos_are_distinct_and_sorted() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app, "/metrics/repos").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "repos": ["acme/rockets", "octo/gadgets", "octo/widgets"] }));
}

#[tokio::test(flavor = "multi_thread")]
async fn pr_average_requires_repo() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app.clone(), "/metrics/pr_average").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Please provide repo parameter", "code": "missing_parameter" })
    );

    let (status, body) = get_json(app, "/metrics/pr_average?repo=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_parameter");
}

#[tokio::test(flavor = "multi_thread")]
async fn pr_average_over_known_repo() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app, "/metrics/pr_average?repo=octo/widgets").await;

    // PRs at -30, -20 and -5 minutes: 25 minutes over two intervals
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["repo"], "octo/widgets");
    assert_eq!(body["average_time_seconds"], json!(750.0));
    assert!(body.get("message").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn pr_average_for_unknown_repo_is_null() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app, "/metrics/pr_average?repo=nobody/nothing").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_time_seconds"], json!(null));
    assert_eq!(body["message"], "Not enough PR events yet");
}

#[tokio::test(flavor = "multi_thread")]
async fn events_count_uses_default_and_explicit_offset() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app.clone(), "/metrics/events_count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "PullRequestEvent": 1, "WatchEvent": 1, "IssuesEvent": 1 }));

    let (_, body) = get_json(app.clone(), "/metrics/events_count?offset=60").await;
    assert_eq!(body, json!({ "PullRequestEvent": 3, "WatchEvent": 2, "IssuesEvent": 1 }));

    let (_, body) = get_json(app, "/metrics/events_count?offset=0").await;
    assert_eq!(body, json!({ "PullRequestEvent": 0, "WatchEvent": 0, "IssuesEvent": 0 }));
}

#[tokio::test(flavor = "multi_thread")]
async fn events_count_rejects_bad_offset() {
    let app = router(seeded_context(fixture()));

    for uri in ["/metrics/events_count?offset=-5", "/metrics/events_count?offset=soon"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "invalid_parameter", "{uri}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn top_repos_ranks_and_limits() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app.clone(), "/metrics/top_repos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "repo": "octo/widgets", "event_count": 4 },
            { "repo": "acme/rockets", "event_count": 1 },
            { "repo": "octo/gadgets", "event_count": 1 },
        ])
    );

    let (_, body) = get_json(app.clone(), "/metrics/top_repos?n=1").await;
    assert_eq!(body, json!([{ "repo": "octo/widgets", "event_count": 4 }]));

    let (_, body) = get_json(app.clone(), "/metrics/top_repos?n=0").await;
    assert_eq!(body, json!([]));

    let (status, body) = get_json(app, "/metrics/top_repos?n=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_parameter");
}

#[tokio::test(flavor = "multi_thread")]
async fn debug_events_returns_first_five_in_store_order() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app, "/debug/events").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body["sample_events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["1", "3", "2", "4", "5"]);
    assert_eq!(body["sample_events"][0]["type"], "PullRequestEvent");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_store_answers_every_route() {
    let app = router(seeded_context(Vec::new()));

    let (_, body) = get_json(app.clone(), "/metrics/repos").await;
    assert_eq!(body, json!({ "repos": [] }));

    let (_, body) = get_json(app.clone(), "/metrics/top_repos").await;
    assert_eq!(body, json!([]));

    let (_, body) = get_json(app, "/debug/events").await;
    assert_eq!(body, json!({ "sample_events": [] }));
}

#[tokio::test(flavor = "multi_thread")]
async fn health_is_degraded_before_polling_starts() {
    let app = router(seeded_context(fixture()));

    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"]["size"], 6);
    assert_eq!(body["poller"]["cycles"], 0);
    let names: Vec<_> =
        body["components"].as_array().unwrap().iter().map(|c| c["name"].clone()).collect();
    assert_eq!(names, [json!("scheduler"), json!("source"), json!("store")]);
}
