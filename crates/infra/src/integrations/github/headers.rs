//! Response header parsing

use std::time::Duration;

use chrono::{DateTime, Utc};
use repopulse_core::RateLimitInfo;
use reqwest::header::{HeaderMap, ETAG, LINK};
use url::Url;

const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
const POLL_INTERVAL: &str = "x-poll-interval";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::trim)
}

fn header_num<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    header_str(headers, name).and_then(|value| value.parse().ok())
}

/// Rate-limit metadata, or `None` when the response carries none of it.
pub fn rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let info = RateLimitInfo {
        limit: header_num(headers, RATE_LIMIT_LIMIT),
        remaining: header_num(headers, RATE_LIMIT_REMAINING),
        reset_at: header_num::<i64>(headers, RATE_LIMIT_RESET)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        poll_interval: header_num::<u64>(headers, POLL_INTERVAL).map(Duration::from_secs),
    };

    (info != RateLimitInfo::default()).then_some(info)
}

pub fn etag(headers: &HeaderMap) -> Option<String> {
    header_str(headers, ETAG.as_str()).filter(|value| !value.is_empty()).map(str::to_string)
}

/// Page number of the `rel="next"` link, if the response advertises one.
///
/// Falls back to `current + 1` when the link has no readable `page` param.
pub fn next_page(headers: &HeaderMap, current: u32) -> Option<u32> {
    let link = header_str(headers, LINK.as_str())?;

    let target = link.split(',').find_map(|part| {
        let (url, params) = part.split_once(';')?;
        params
            .split(';')
            .any(|param| param.trim() == r#"rel="next""#)
            .then(|| url.trim().trim_start_matches('<').trim_end_matches('>'))
    })?;

    let page = Url::parse(target).ok().and_then(|url| {
        url.query_pairs().find(|(key, _)| key == "page").and_then(|(_, value)| value.parse().ok())
    });
    Some(page.unwrap_or(current + 1))
}
