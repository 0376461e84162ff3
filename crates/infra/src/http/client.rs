use std::time::Duration;

use repopulse_domain::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use repopulse_domain::RepoPulseError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::errors::InfraError;

/// Delay before the first retry when the server gives no `Retry-After`.
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Longest `Retry-After` honoured inside one request. Anything longer is
/// left to the poll schedule.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

/// GET client used by the polling adapters.
///
/// Gateway errors (502/503/504) and connect or timeout failures are retried
/// within the request, honouring a short `Retry-After`. Every other status
/// goes back to the adapter, which owns rate-limit semantics.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Send `request`, re-sending it while the failure looks transient.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, RepoPulseError> {
        let mut attempt = 1;

        loop {
            let built = request
                .try_clone()
                .ok_or_else(|| RepoPulseError::Internal("request is not retryable".into()))?
                .build()
                .map_err(into_domain)?;
            let url = built.url().clone();

            let outcome = self.client.execute(built).await;
            let delay = match &outcome {
                Ok(response) if is_transient_status(response.status()) => {
                    retry_delay(attempt, retry_after(response.headers()))
                }
                Err(err) if should_retry_error(err) => retry_delay(attempt, None),
                _ => None,
            };

            match delay {
                Some(delay) if attempt < self.max_attempts => {
                    debug!(
                        attempt,
                        %url,
                        delay_ms = delay.as_millis() as u64,
                        outcome = %describe(&outcome),
                        "retrying HTTP request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                _ => return outcome.map_err(into_domain),
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    user_agent: String,
    default_headers: HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: HeaderMap::new(),
        }
    }
}

impl HttpClientBuilder {
    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts including the first; at least one.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    /// Proxy settings come from the environment (`HTTPS_PROXY`, `NO_PROXY`).
    pub fn build(self) -> Result<HttpClient, RepoPulseError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .default_headers(self.default_headers)
            .build()
            .map_err(into_domain)?;

        Ok(HttpClient { client, max_attempts: self.max_attempts })
    }
}

fn into_domain(err: reqwest::Error) -> RepoPulseError {
    InfraError::from(err).into()
}

fn describe(outcome: &Result<Response, reqwest::Error>) -> String {
    match outcome {
        Ok(response) => response.status().to_string(),
        Err(err) => err.to_string(),
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// `Retry-After` in delta-seconds form, the only form GitHub sends.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Delay before re-sending after failed `attempt` (1-based), or `None` when
/// the server asked for a longer pause than a single request should absorb.
fn retry_delay(attempt: usize, retry_after: Option<Duration>) -> Option<Duration> {
    match retry_after {
        Some(wait) if wait > MAX_RETRY_AFTER => None,
        Some(wait) => Some(wait),
        None => {
            let shift = attempt.saturating_sub(1).min(6) as u32;
            Some(RETRY_BACKOFF.saturating_mul(1 << shift))
        }
    }
}
