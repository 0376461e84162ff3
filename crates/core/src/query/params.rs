//! Parameter parsing for query operations
//!
//! Raw values arrive as optional strings exactly as a front end received
//! them. Surrounding whitespace is ignored.

use chrono::Duration;
use repopulse_domain::constants::{DEFAULT_OFFSET_MINUTES, DEFAULT_TOP_N};
use repopulse_domain::RepoName;

use super::error::QueryError;

pub const REPO: &str = "repo";
pub const OFFSET: &str = "offset";
pub const TOP_N: &str = "n";

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Required `repo` parameter in `owner/name` form.
pub fn repo(raw: Option<&str>) -> Result<RepoName, QueryError> {
    let value = present(raw).ok_or(QueryError::MissingParameter(REPO))?;
    RepoName::new(value)
        .map_err(|_| QueryError::invalid(REPO, value, "expected owner/name"))
}

/// Optional `offset` window in minutes, default 10.
pub fn offset(raw: Option<&str>) -> Result<Duration, QueryError> {
    let Some(value) = present(raw) else {
        return Ok(Duration::minutes(DEFAULT_OFFSET_MINUTES));
    };

    let minutes: i64 = value
        .parse()
        .map_err(|_| QueryError::invalid(OFFSET, value, "expected an integer number of minutes"))?;
    if minutes < 0 {
        return Err(QueryError::invalid(OFFSET, value, "must not be negative"));
    }

    Duration::try_minutes(minutes).ok_or_else(|| QueryError::invalid(OFFSET, value, "out of range"))
}

/// Optional `n` result count, default 5. Non-positive values are accepted
/// and produce an empty ranking.
pub fn top_n(raw: Option<&str>) -> Result<i64, QueryError> {
    let Some(value) = present(raw) else {
        return Ok(DEFAULT_TOP_N);
    };

    value.parse().map_err(|_| QueryError::invalid(TOP_N, value, "expected an integer"))
}
