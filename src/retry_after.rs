//! `Retry-After` handling for transient server errors.
//!
//! When GeoNet (or a proxy in front of it) answers 503 with a `Retry-After`
//! header, the retry loop waits for the indicated time instead of its own
//! backoff, capped at the configured maximum wait.

use http::HeaderMap;
use std::time::{Duration, SystemTime};

/// Parses the `Retry-After` header.
///
/// Supports both delay-seconds and HTTP-date forms. A date in the past, or a
/// header that is neither, yields `None`.
///
/// # Examples
///
/// ```
/// use gnet::retry_after::parse_retry_after;
/// use http::{HeaderMap, HeaderValue};
/// use std::time::Duration;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("retry-after", HeaderValue::from_static("7"));
/// assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));
/// ```
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    date_time.duration_since(SystemTime::now()).ok()
}
