//! The GeoNet API client.
//!
//! [`Client`] is the entry point: one typed method per endpoint, all going
//! through the same pipeline. A request is built, sent under the retry
//! policy, and the final 2xx body is decoded exactly once. Every terminal
//! failure is logged once with `tracing::error!` and returned as an
//! [`Error`]; successes are not logged.

use crate::{
    config::ClientConfig,
    models::{
        quake::HistoryBody, Aggregation, CapFeed, IntensityKind, IntensityResponse, QuakeFeature,
        QuakeHistory, QuakeResponse, QuakeStats, StrongMotionResponse, VolcanoAlerts,
    },
    request::{Request, ACCEPT_JSON, ACCEPT_XML},
    retry::{RetryPolicy, RetryPredicate, RetryStrategy},
    retry_after::parse_retry_after,
    search::QuakeSearch,
    Error, Response, Result,
};
use http::{header::ACCEPT, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("gnet/", env!("CARGO_PKG_VERSION"));

/// A client for the GeoNet API.
///
/// Cloning is cheap: clones share one connection pool and one frozen
/// configuration, so a client can serve concurrent calls. The pool is closed
/// when the last clone is dropped, whether the calls succeeded or not.
///
/// # Examples
///
/// ```no_run
/// use gnet::Client;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), gnet::Error> {
/// let client = Client::builder()
///     .timeout(Duration::from_secs(10))
///     .max_retries(2)
///     .build()?;
///
/// let quakes = client.get_quakes(Some(4), Some(5)).await?;
/// for quake in quakes.iter() {
///     println!("{} M{:.1} {}", quake.properties.public_id, quake.properties.magnitude, quake.properties.locality);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    retry: RetryPolicy,
}

impl Client {
    /// Creates a new `ClientBuilder` starting from the default configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Builds a client from `GEONET_*` environment variables over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] or [`Error::InvalidUrl`] for unusable settings.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env()?.build()
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends `request` and decodes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the classified transport or HTTP error, [`Error::ExhaustedRetries`]
    /// if a retryable failure outlasted the policy, or [`Error::Parse`] if the
    /// body does not match `T`.
    pub async fn call<T: DeserializeOwned>(&self, request: Request) -> Result<Response<T>> {
        self.call_with(request, |body| {
            serde_json::from_str(body).map_err(|e| e.to_string())
        })
        .await
    }

    /// Sends `request` and returns the body as text.
    pub async fn call_text(&self, request: Request) -> Result<Response<String>> {
        self.call_with(request, |body| Ok(body.to_string())).await
    }

    /// Fetches an arbitrary GeoJSON endpoint, e.g. `client.get::<serde_json::Value>("news/geonet")`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Response<T>> {
        self.call(Request::new(path)).await
    }

    async fn call_with<T, D>(&self, request: Request, decode: D) -> Result<Response<T>>
    where
        D: FnOnce(&str) -> std::result::Result<T, String>,
    {
        let endpoint = request.endpoint();
        let start = Instant::now();

        let sent = {
            let request = &request;
            let endpoint = endpoint.as_str();
            self.inner
                .retry
                .run(move |attempt| self.execute(request, endpoint, attempt))
                .await
        };

        sent.and_then(|((status, body), attempts)| match decode(&body) {
            Ok(data) => Ok(Response::new(data, status, start.elapsed(), attempts)),
            Err(message) => Err(Error::Parse {
                endpoint: endpoint.clone(),
                message,
                raw_response: body,
            }),
        })
        .map_err(|error| report(&request, error))
    }

    /// Runs one attempt and returns the status and body of a 2xx answer.
    async fn execute(
        &self,
        request: &Request,
        endpoint: &str,
        attempt: usize,
    ) -> Result<(StatusCode, String)> {
        let url = request.url(&self.inner.config.base_url)?;
        let timeout = request
            .timeout_override()
            .unwrap_or(self.inner.config.timeout);

        tracing::debug!(url = %url, attempt = attempt, "Executing GeoNet request");

        let response = self
            .inner
            .http
            .get(url)
            .header(ACCEPT, request.accept_header())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_transport(endpoint, e))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| Error::from_transport(endpoint, e))?;
            Ok((status, body))
        } else {
            // The status alone decides the classification of a failed answer.
            let body = response.text().await.unwrap_or_default();
            Err(Error::from_status(endpoint, status, body, retry_after))
        }
    }

    /// Lists recent quakes.
    ///
    /// `mmi` is the server-side intensity filter (`-1..=8`, default `-1`
    /// for everything). `limit` keeps the first N quakes in server order;
    /// `None` or `Some(0)` keeps them all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for an out-of-range `mmi`, before
    /// any request is sent.
    pub async fn get_quakes(
        &self,
        mmi: Option<i32>,
        limit: Option<usize>,
    ) -> Result<Response<QuakeResponse>> {
        let mmi = match mmi {
            Some(mmi) if !(-1..=8).contains(&mmi) => {
                return Err(Error::InvalidParameter {
                    name: "mmi",
                    reason: format!("{mmi} is outside -1..=8"),
                })
            }
            mmi => mmi.unwrap_or(-1),
        };

        let request = Request::new("quake").param("MMI", Some(mmi));
        self.call::<QuakeResponse>(request)
            .await
            .map(|response| response.map(|quakes| quakes.limit(limit)))
    }

    /// Fetches one quake by public ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the server answers with an empty collection.
    pub async fn get_quake(&self, public_id: &str) -> Result<Response<QuakeFeature>> {
        let public_id = identifier("public_id", public_id)?;
        let request = Request::new("quake").segment(public_id.as_str());
        let endpoint = request.endpoint();

        self.call::<QuakeResponse>(request.clone())
            .await?
            .try_map(|quakes| {
                quakes.into_features().into_iter().next().ok_or_else(|| {
                    report(
                        &request,
                        Error::NotFound {
                            endpoint,
                            id: public_id,
                        },
                    )
                })
            })
    }

    /// Fetches every revision of a quake's solution.
    pub async fn get_quake_history(&self, public_id: &str) -> Result<Response<QuakeHistory>> {
        let public_id = identifier("public_id", public_id)?;
        let request = Request::new("quake/history").segment(public_id);

        self.call::<HistoryBody>(request)
            .await
            .map(|response| response.map(QuakeHistory::from))
    }

    /// Fetches quake counts by magnitude and per-day rates.
    pub async fn get_quake_stats(&self) -> Result<Response<QuakeStats>> {
        self.call(Request::new("quake/stats").accept(ACCEPT_JSON))
            .await
    }

    /// Fetches all recent quakes and narrows them with `search`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for inverted bounds without making
    /// a request. Fetch errors pass through unchanged and the filters are
    /// never applied.
    pub async fn search_quakes(&self, search: &QuakeSearch) -> Result<Response<QuakeResponse>> {
        search.validate()?;
        self.get_quakes(None, None)
            .await
            .map(|response| response.map(|quakes| search.apply(quakes)))
    }

    /// Checks the API answers, returning the round-trip latency.
    pub async fn health_check(&self) -> Result<Duration> {
        self.call_text(Request::new("quake").param("MMI", Some(-1)))
            .await
            .map(|response| response.latency)
    }

    /// Fetches shaking intensity, optionally for one quake.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `aggregation` is given for
    /// measured intensity, or `public_id` is blank.
    pub async fn get_intensity(
        &self,
        kind: IntensityKind,
        public_id: Option<&str>,
        aggregation: Option<Aggregation>,
    ) -> Result<Response<IntensityResponse>> {
        if aggregation.is_some() && kind != IntensityKind::Reported {
            return Err(Error::InvalidParameter {
                name: "aggregation",
                reason: format!("only applies to reported intensity, not {kind}"),
            });
        }
        let public_id = public_id
            .map(|id| identifier("public_id", id))
            .transpose()?;

        let request = Request::new("intensity")
            .param("type", Some(kind))
            .param("publicID", public_id)
            .param("aggregation", aggregation);
        self.call(request).await
    }

    /// Fetches volcanic alert levels, optionally for a single volcano.
    pub async fn get_volcano_alerts(
        &self,
        volcano_id: Option<&str>,
    ) -> Result<Response<VolcanoAlerts>> {
        let volcano_id = volcano_id
            .map(|id| identifier("volcano_id", id))
            .transpose()?;

        self.call::<VolcanoAlerts>(Request::new("volcano/val"))
            .await
            .map(|response| {
                response.map(|alerts| match &volcano_id {
                    Some(id) => alerts.for_volcano(id),
                    None => alerts,
                })
            })
    }

    /// Fetches quakes near a volcano, keeping those of at least `min_magnitude`.
    pub async fn get_volcano_quakes(
        &self,
        volcano_id: &str,
        min_magnitude: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Response<QuakeResponse>> {
        let volcano_id = identifier("volcano_id", volcano_id)?;
        let request = Request::new("volcano/quake").param("volcanoID", Some(volcano_id));

        self.call::<QuakeResponse>(request).await.map(|response| {
            response.map(|quakes| quakes.filter_by_magnitude(min_magnitude, None).limit(limit))
        })
    }

    /// Fetches processed strong-motion station data for a quake.
    pub async fn get_strong_motion(&self, public_id: &str) -> Result<Response<StrongMotionResponse>> {
        let public_id = identifier("public_id", public_id)?;
        self.call(Request::new("intensity/strong/processed").segment(public_id))
            .await
    }

    /// Fetches the Atom feed of CAP quake alerts.
    pub async fn get_cap_feed(&self) -> Result<Response<CapFeed>> {
        let request = Request::new("cap/1.2/GPA1.0/feed/atom1.0/quake").accept(ACCEPT_XML);
        self.call_with(request, |body| {
            CapFeed::from_atom(body).map_err(|e| e.to_string())
        })
        .await
    }

    /// Fetches one CAP alert document as raw XML.
    ///
    /// `cap_id` is the identifier from a feed entry, e.g. `2024p321000.1714556100`.
    pub async fn get_cap_alert(&self, cap_id: &str) -> Result<Response<String>> {
        let cap_id = identifier("cap_id", cap_id)?;
        self.call_text(
            Request::new("cap/1.2/GPA1.0/quake")
                .segment(cap_id)
                .accept(ACCEPT_XML),
        )
        .await
    }
}

/// Trims an identifier, rejecting it if nothing is left.
fn identifier(name: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidParameter {
            name,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Logs a terminal failure and hands the error back.
fn report(request: &Request, error: Error) -> Error {
    tracing::error!(
        endpoint = %request.endpoint(),
        params = %request.query_string(),
        kind = %error.kind(),
        error = %error,
        "GeoNet request failed"
    );
    error
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```
/// use gnet::ClientBuilder;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), gnet::Error> {
/// let client = ClientBuilder::new()
///     .base_url("http://localhost:8080/geonet/")?
///     .timeout(Duration::from_secs(5))
///     .retry_wait(Duration::from_millis(250), Duration::from_secs(2))
///     .jitter(true)
///     .default_header("X-Request-Source", "nightly-report")?
///     .build()?;
///
/// assert_eq!(client.config().timeout, Duration::from_secs(5));
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
    default_headers: HeaderMap,
    retry_predicate: Option<Arc<dyn RetryPredicate>>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a builder seeded from `GEONET_*` environment variables.
    pub fn from_env() -> Result<Self> {
        ClientConfig::from_env().map(Self::with_config)
    }

    /// Creates a builder seeded from an existing configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            default_headers: HeaderMap::new(),
            retry_predicate: None,
        }
    }

    /// Sets the base URL every endpoint is resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.config.base_url = url::Url::parse(url.as_ref())?;
        Ok(self)
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets how many times a retryable failure is retried.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Sets the first backoff delay and the cap on any delay.
    pub fn retry_wait(mut self, min: Duration, max: Duration) -> Self {
        self.config.retry_min_wait = min;
        self.config.retry_max_wait = max;
        self
    }

    /// Scales each backoff delay by a random factor in `[0.5, 1.0]`.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.config.jitter = jitter;
        self
    }

    /// Sets whether a server's `Retry-After` replaces the computed delay.
    pub fn honor_retry_after(mut self, honor: bool) -> Self {
        self.config.honor_retry_after = honor;
        self
    }

    /// Replaces the default retry predicate ([`Error::is_retryable`]).
    pub fn retry_predicate(mut self, predicate: Arc<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {e}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Validates the configuration and builds the `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the configuration is inconsistent
    /// or the HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(self.default_headers)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: self.config.retry_min_wait,
            max_delay: self.config.retry_max_wait,
            max_retries: self.config.max_retries,
            jitter: self.config.jitter,
        };
        let mut retry =
            RetryPolicy::new(strategy).honor_retry_after(self.config.honor_retry_after);
        if let Some(predicate) = self.retry_predicate {
            retry = retry.with_predicate(predicate);
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                retry,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_trimmed() {
        assert_eq!(identifier("public_id", "  2016p858000 ").unwrap(), "2016p858000");
        assert!(matches!(
            identifier("public_id", " \t"),
            Err(Error::InvalidParameter { name: "public_id", .. })
        ));
    }

    #[test]
    fn test_build_rejects_inverted_retry_bounds() {
        let result = Client::builder()
            .retry_wait(Duration::from_secs(5), Duration::from_secs(1))
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_build_rejects_bad_header() {
        let result = Client::builder().default_header("bad header", "x");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_clones_share_configuration() {
        let client = Client::builder().max_retries(7).build().unwrap();
        let clone = client.clone();

        assert!(Arc::ptr_eq(&client.inner, &clone.inner));
        assert_eq!(clone.config().max_retries, 7);
    }

    #[tokio::test]
    async fn test_invalid_mmi_is_rejected_before_sending() {
        let client = Client::builder()
            .base_url("http://127.0.0.1:1/")
            .unwrap()
            .build()
            .unwrap();

        let result = client.get_quakes(Some(9), None).await;
        assert!(matches!(result, Err(Error::InvalidParameter { name: "mmi", .. })));

        let result = client
            .get_intensity(IntensityKind::Measured, None, Some(Aggregation::Max))
            .await;
        assert!(matches!(
            result,
            Err(Error::InvalidParameter { name: "aggregation", .. })
        ));

        let result = client.get_quake("   ").await;
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }
}
