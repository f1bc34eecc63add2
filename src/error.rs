//! Error types for GeoNet API calls.
//!
//! Every fallible operation in this crate returns [`Result`]. Errors are plain
//! data: they carry the endpoint that failed, the HTTP status and body when
//! there was one, and the underlying transport error otherwise. Nothing in the
//! request pipeline panics on a network or data condition.

use http::StatusCode;
use std::fmt;
use std::time::Duration;

/// The main error type for GeoNet API calls.
///
/// # Examples
///
/// ```no_run
/// use gnet::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().build()?;
///
/// match client.get_quake("2016p858000").await {
///     Ok(feature) => println!("M{}", feature.properties.magnitude),
///     Err(Error::NotFound { id, .. }) => eprintln!("no quake {id}"),
///     Err(Error::ExhaustedRetries { attempts, last_error }) => {
///         eprintln!("gave up after {attempts} attempts: {last_error}");
///     }
///     Err(e) => eprintln!("{} error: {e}", e.kind()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The connection could not be established (refused, DNS failure, reset).
    #[error("Connection to {endpoint} failed: {source}")]
    Connection {
        /// Path of the endpoint that was being called.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The attempt exceeded its timeout, or the server answered 408.
    #[error("Request to {endpoint} timed out")]
    Timeout {
        /// Path of the endpoint that was being called.
        endpoint: String,
    },

    /// The server answered with a 5xx status.
    #[error("Server error {status} from {endpoint}: {body}")]
    Server {
        /// Path of the endpoint that was being called.
        endpoint: String,
        /// The HTTP status code.
        status: StatusCode,
        /// The raw response body.
        body: String,
        /// Delay requested by a `Retry-After` header, if the server sent one.
        retry_after: Option<Duration>,
    },

    /// The server answered with a 4xx status other than 408.
    #[error("Client error {status} from {endpoint}: {body}")]
    Client {
        /// Path of the endpoint that was being called.
        endpoint: String,
        /// The HTTP status code.
        status: StatusCode,
        /// The raw response body.
        body: String,
    },

    /// A 2xx body did not match the expected schema.
    ///
    /// The raw body is preserved so schema drift can be diagnosed.
    #[error("Failed to parse response from {endpoint}: {message}")]
    Parse {
        /// Path of the endpoint that was being called.
        endpoint: String,
        /// The decoder's error message.
        message: String,
        /// The body that failed to parse.
        raw_response: String,
    },

    /// A retryable failure persisted through every allowed attempt.
    #[error("Gave up after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        /// Total number of attempts made, including the first.
        attempts: usize,
        /// The error from the final attempt.
        last_error: Box<Error>,
    },

    /// A caller-supplied parameter was rejected before any request was sent.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The endpoint answered successfully but held no record for the identifier.
    #[error("No record for `{id}` at {endpoint}")]
    NotFound {
        /// Path of the endpoint that was being called.
        endpoint: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An invalid base URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Coarse classification of an [`Error`], used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection refused, DNS failure or other transport fault.
    Connection,
    /// The attempt exceeded its time budget.
    Timeout,
    /// Retryable HTTP 5xx.
    Server,
    /// Non-retryable caller-side failure (HTTP 4xx, bad parameter, missing record).
    Client,
    /// Response body did not match its schema.
    Parse,
    /// Retries ran out on a retryable failure.
    ExhaustedRetries,
    /// The client itself was misconfigured.
    Configuration,
}

impl ErrorKind {
    /// Returns a stable snake_case name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Server => "server",
            ErrorKind::Client => "client",
            ErrorKind::Parse => "parse",
            ErrorKind::ExhaustedRetries => "exhausted_retries",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classifies a transport-level `reqwest` failure.
    pub(crate) fn from_transport(endpoint: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Error::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else {
            Error::Connection {
                endpoint: endpoint.to_string(),
                source,
            }
        }
    }

    /// Classifies a non-2xx HTTP answer.
    pub(crate) fn from_status(
        endpoint: &str,
        status: StatusCode,
        body: String,
        retry_after: Option<Duration>,
    ) -> Self {
        let endpoint = endpoint.to_string();
        if status == StatusCode::REQUEST_TIMEOUT {
            Error::Timeout { endpoint }
        } else if status.is_server_error() {
            Error::Server {
                endpoint,
                status,
                body,
                retry_after,
            }
        } else {
            Error::Client {
                endpoint,
                status,
                body,
            }
        }
    }

    /// Returns the classification of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use gnet::{Error, ErrorKind};
    ///
    /// let err = Error::Timeout { endpoint: "/quake".to_string() };
    /// assert_eq!(err.kind(), ErrorKind::Timeout);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection { .. } => ErrorKind::Connection,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Server { .. } => ErrorKind::Server,
            Error::Client { .. } | Error::InvalidParameter { .. } | Error::NotFound { .. } => {
                ErrorKind::Client
            }
            Error::Parse { .. } => ErrorKind::Parse,
            Error::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
            Error::Configuration(_) | Error::InvalidUrl(_) => ErrorKind::Configuration,
        }
    }

    /// Returns `true` if re-sending the same request could plausibly succeed.
    ///
    /// Connection failures, timeouts and 5xx answers are retryable. Client
    /// errors, parse failures and configuration problems are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Connection | ErrorKind::Timeout | ErrorKind::Server
        )
    }

    /// Returns the endpoint path this error originated from, if any.
    ///
    /// For [`Error::ExhaustedRetries`] this is the endpoint of the last attempt.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Error::Connection { endpoint, .. }
            | Error::Timeout { endpoint }
            | Error::Server { endpoint, .. }
            | Error::Client { endpoint, .. }
            | Error::Parse { endpoint, .. }
            | Error::NotFound { endpoint, .. } => Some(endpoint),
            Error::ExhaustedRetries { last_error, .. } => last_error.endpoint(),
            Error::InvalidParameter { .. } | Error::Configuration(_) | Error::InvalidUrl(_) => {
                None
            }
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Server { status, .. } | Error::Client { status, .. } => Some(*status),
            Error::ExhaustedRetries { last_error, .. } => last_error.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Server { body, .. } | Error::Client { body, .. } => Some(body),
            Error::Parse { raw_response, .. } => Some(raw_response),
            Error::ExhaustedRetries { last_error, .. } => last_error.raw_response(),
            _ => None,
        }
    }

    /// Returns the delay the server asked for via `Retry-After`, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Server { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// A specialized `Result` type for GeoNet API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = Error::from_status("/quake", StatusCode::SERVICE_UNAVAILABLE, "down".into(), None);
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(err.is_retryable());

        let err = Error::from_status("/quake", StatusCode::NOT_FOUND, "nope".into(), None);
        assert_eq!(err.kind(), ErrorKind::Client);
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

        let err = Error::from_status("/quake", StatusCode::REQUEST_TIMEOUT, String::new(), None);
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());

        let err = Error::from_status("/quake", StatusCode::TOO_MANY_REQUESTS, String::new(), None);
        assert_eq!(err.kind(), ErrorKind::Client);
    }

    #[test]
    fn test_non_retryable_kinds() {
        let parse = Error::Parse {
            endpoint: "/quake".into(),
            message: "missing field `publicID`".into(),
            raw_response: "{}".into(),
        };
        assert!(!parse.is_retryable());
        assert_eq!(parse.raw_response(), Some("{}"));

        let param = Error::InvalidParameter {
            name: "MMI",
            reason: "out of range".into(),
        };
        assert_eq!(param.kind(), ErrorKind::Client);
        assert_eq!(param.endpoint(), None);

        assert_eq!(
            Error::Configuration("bad".into()).kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_exhausted_retries_exposes_last_error() {
        let err = Error::ExhaustedRetries {
            attempts: 3,
            last_error: Box::new(Error::Server {
                endpoint: "/volcano/val".into(),
                status: StatusCode::BAD_GATEWAY,
                body: "upstream".into(),
                retry_after: None,
            }),
        };

        assert_eq!(err.kind(), ErrorKind::ExhaustedRetries);
        assert!(!err.is_retryable());
        assert_eq!(err.endpoint(), Some("/volcano/val"));
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.raw_response(), Some("upstream"));
        assert!(err.to_string().contains("3 attempts"));
    }
}
