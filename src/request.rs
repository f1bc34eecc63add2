//! Request descriptors.

use crate::{Error, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// `Accept` value for GeoJSON endpoints.
pub const ACCEPT_GEOJSON: &str = "application/vnd.geo+json;version=2";
/// `Accept` value for plain JSON endpoints such as `quake/stats`.
pub const ACCEPT_JSON: &str = "application/json;version=2";
/// `Accept` value for CAP documents and feeds.
pub const ACCEPT_XML: &str = "application/xml";

/// Describes a single read-only GET request.
///
/// Built per call and consumed by [`Client::call`](crate::Client::call).
/// Query parameters whose value is absent or empty are omitted.
///
/// # Examples
///
/// ```
/// use gnet::Request;
///
/// let request = Request::new("intensity")
///     .param("type", Some("reported"))
///     .param("publicID", None::<&str>)
///     .param("aggregation", Some(""));
///
/// assert_eq!(request.endpoint(), "/intensity");
/// assert_eq!(request.query(), &[("type".to_string(), "reported".to_string())]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    segments: Vec<String>,
    query: Vec<(String, String)>,
    accept: &'static str,
    timeout: Option<Duration>,
}

impl Request {
    /// Creates a request for `path`, split on `/` into path segments.
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            accept: ACCEPT_GEOJSON,
            timeout: None,
        }
    }

    /// Appends one path segment. The segment is percent-encoded when the URL is built.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Adds a query parameter, skipping it when the value is `None` or renders empty.
    pub fn param<V: fmt::Display>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.query.push((key.to_string(), value));
            }
        }
        self
    }

    /// Overrides the `Accept` header for this request.
    pub fn accept(mut self, accept: &'static str) -> Self {
        self.accept = accept;
        self
    }

    /// Overrides the client's per-attempt timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the endpoint path, e.g. `/quake/stats`.
    pub fn endpoint(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Returns the query parameters in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the `Accept` header value.
    pub fn accept_header(&self) -> &'static str {
        self.accept
    }

    /// Returns the per-request timeout override, if any.
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Renders the query parameters as `k=v&k=v` for logging.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Resolves this request against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `base` cannot carry a path.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::Configuration(format!("{base} cannot be used as a base URL"))
            })?;
            path.pop_if_empty();
            path.extend(&self.segments);
        }

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "GET {}", self.endpoint())
        } else {
            write!(f, "GET {}?{}", self.endpoint(), self.query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_against_root_base() {
        let base = Url::parse("https://api.geonet.org.nz/").unwrap();
        let request = Request::new("quake").param("MMI", Some(-1));

        let url = request.url(&base).unwrap();
        assert_eq!(url.as_str(), "https://api.geonet.org.nz/quake?MMI=-1");
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let base = Url::parse("http://localhost:9000/mirror/").unwrap();
        let request = Request::new("/quake/history/").segment("2016p858000");

        let url = request.url(&base).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/mirror/quake/history/2016p858000"
        );
        assert_eq!(request.endpoint(), "/quake/history/2016p858000");
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let base = Url::parse("https://api.geonet.org.nz").unwrap();
        let request = Request::new("quake").segment("a b/c");

        let url = request.url(&base).unwrap();
        assert_eq!(url.path(), "/quake/a%20b%2Fc");
    }

    #[test]
    fn test_empty_and_absent_params_are_omitted() {
        let request = Request::new("volcano/quake")
            .param("volcanoID", Some("ruapehu"))
            .param::<u32>("limit", None)
            .param("note", Some(String::new()));

        assert_eq!(request.query_string(), "volcanoID=ruapehu");
        assert_eq!(request.to_string(), "GET /volcano/quake?volcanoID=ruapehu");

        let url = Request::new("volcano/val")
            .url(&Url::parse("https://api.geonet.org.nz/").unwrap())
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_accept_and_timeout_overrides() {
        let request = Request::new("quake/stats")
            .accept(ACCEPT_JSON)
            .timeout(Duration::from_secs(5));

        assert_eq!(request.accept_header(), ACCEPT_JSON);
        assert_eq!(request.timeout_override(), Some(Duration::from_secs(5)));
        assert_eq!(Request::new("quake").accept_header(), ACCEPT_GEOJSON);
    }
}
