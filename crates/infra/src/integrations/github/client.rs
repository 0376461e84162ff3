//! GitHub events API client

use async_trait::async_trait;
use repopulse_core::{Cursor, EventSource, FetchError, FetchPage, RateLimitInfo};
use repopulse_domain::{RawEvent, RepoPulseError, Result as DomainResult, SourceConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::cursor::PageCursor;
use super::headers;
use crate::http::HttpClient;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Reads the public event feed at `{base_url}/events`.
///
/// The token is optional; without it GitHub applies the anonymous rate limit.
pub struct GitHubEventSource {
    http_client: HttpClient,
    events_url: String,
    per_page: u32,
}

impl GitHubEventSource {
    /// Build a source with an HTTP client configured from `config`.
    ///
    /// # Errors
    /// Returns `RepoPulseError::Config` if the token is not a valid header
    /// value, or the HTTP client cannot be built.
    pub fn from_config(config: &SourceConfig) -> DomainResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        default_headers
            .insert(GITHUB_API_VERSION_HEADER, HeaderValue::from_static(GITHUB_API_VERSION));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                RepoPulseError::Config("GITHUB_TOKEN contains invalid characters".into())
            })?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }

        let http_client = HttpClient::builder()
            .timeout(config.request_timeout())
            .max_attempts(config.max_attempts)
            .user_agent(config.user_agent.clone())
            .default_headers(default_headers)
            .build()?;

        Ok(Self::new(http_client, &config.base_url, config.per_page))
    }

    pub fn new(http_client: HttpClient, base_url: &str, per_page: u32) -> Self {
        Self {
            http_client,
            events_url: format!("{}/events", base_url.trim_end_matches('/')),
            per_page,
        }
    }

    fn rate_limited(status: StatusCode, rate_limit: Option<&RateLimitInfo>) -> Option<FetchError> {
        let exhausted = rate_limit.is_some_and(RateLimitInfo::is_exhausted);
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                Some(FetchError::RateLimited { reset_at: rate_limit.and_then(|info| info.reset_at) })
            }
            StatusCode::FORBIDDEN if exhausted => {
                Some(FetchError::RateLimited { reset_at: rate_limit.and_then(|info| info.reset_at) })
            }
            _ => None,
        }
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn network_error(err: RepoPulseError) -> FetchError {
    match err {
        RepoPulseError::Network(message) => FetchError::Network(message),
        other => FetchError::from(other),
    }
}

#[async_trait]
impl EventSource for GitHubEventSource {
    #[instrument(skip(self), fields(cursor = %cursor))]
    async fn fetch_page(&self, cursor: &Cursor) -> Result<FetchPage, FetchError> {
        let position = PageCursor::decode(cursor)?;

        let mut request = self
            .http_client
            .get(&self.events_url)
            .query(&[("per_page", self.per_page), ("page", position.page)]);
        if position.is_first() {
            if let Some(etag) = &position.etag {
                request = request.header(IF_NONE_MATCH, etag.as_str());
            }
        }

        let response = self.http_client.send(request).await.map_err(network_error)?;
        let status = response.status();
        let response_headers = response.headers().clone();
        let rate_limit = headers::rate_limit(&response_headers);
        debug!(
            status = status.as_u16(),
            page = position.page,
            remaining = ?rate_limit.and_then(|info| info.remaining),
            "received events response"
        );

        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchPage {
                records: Vec::new(),
                next_page: None,
                resume_from: position.resume().encode(),
                rate_limit,
            });
        }

        if let Some(err) = Self::rate_limited(status, rate_limit.as_ref()) {
            warn!(status = status.as_u16(), "GitHub rate limit exhausted");
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(FetchError::Http { status: status.as_u16(), message: error_message(&body) });
        }

        let records = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(items)) => items.iter().map(RawEvent::from_json).collect::<Vec<_>>(),
            Ok(Value::Object(object)) => {
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unexpected object response")
                    .to_string();
                return Err(FetchError::Api { message });
            }
            Ok(_) => return Err(FetchError::Malformed("expected a JSON array of events".into())),
            Err(e) => return Err(FetchError::Malformed(format!("invalid JSON body: {e}"))),
        };

        let walk = if position.is_first() {
            PageCursor::first(headers::etag(&response_headers).or(position.etag.clone()))
        } else {
            position.clone()
        };
        let next_page = headers::next_page(&response_headers, position.page)
            .map(|page| walk.next(page).encode());

        Ok(FetchPage { records, next_page, resume_from: walk.resume().encode(), rate_limit })
    }
}
