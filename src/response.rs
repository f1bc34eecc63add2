//! Successful call results with request metadata.

use http::StatusCode;
use std::time::Duration;

/// A parsed response together with details of the HTTP exchange that produced it.
///
/// Dereferences to the parsed data, so most callers can treat a
/// `Response<QuakeResponse>` as a `QuakeResponse`.
///
/// # Examples
///
/// ```
/// use gnet::Response;
/// use http::StatusCode;
/// use std::time::Duration;
///
/// let response = Response::new(vec![1, 2, 3], StatusCode::OK, Duration::from_millis(80), 2);
///
/// assert_eq!(response.len(), 3);
/// assert!(response.was_retried());
///
/// let total = response.map(|values| values.iter().sum::<i32>());
/// assert_eq!(total.data, 6);
/// assert_eq!(total.attempts, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The parsed response data.
    pub data: T,

    /// HTTP status of the successful attempt.
    pub status: StatusCode,

    /// Time from the first attempt until the successful body was received,
    /// including any backoff delays.
    pub latency: Duration,

    /// Number of attempts it took; `1` when no retry was needed.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(data: T, status: StatusCode, latency: Duration, attempts: usize) -> Self {
        Self {
            data,
            status,
            latency,
            attempts,
        }
    }

    /// Transforms the data while keeping the exchange metadata.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            status: self.status,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Like [`map`](Self::map), for transformations that can fail.
    pub fn try_map<U, E, F>(self, f: F) -> std::result::Result<Response<U>, E>
    where
        F: FnOnce(T) -> std::result::Result<U, E>,
    {
        Ok(Response {
            data: f(self.data)?,
            status: self.status,
            latency: self.latency,
            attempts: self.attempts,
        })
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Discards the metadata and returns the data.
    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
