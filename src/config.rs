//! Client configuration.
//!
//! A [`ClientConfig`] is fully determined before a [`Client`](crate::Client)
//! is built and is frozen inside it afterwards.

use crate::{Error, Result};
use std::time::Duration;
use url::Url;

/// Default GeoNet API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.geonet.org.nz/";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "GEONET_API_URL";
/// Environment variable overriding the per-attempt timeout, in seconds.
pub const ENV_TIMEOUT: &str = "GEONET_TIMEOUT";
/// Environment variable overriding the retry count.
pub const ENV_RETRIES: &str = "GEONET_RETRIES";
/// Environment variable overriding the first backoff delay, in seconds.
pub const ENV_RETRY_MIN_WAIT: &str = "GEONET_RETRY_MIN_WAIT";
/// Environment variable overriding the backoff cap, in seconds.
pub const ENV_RETRY_MAX_WAIT: &str = "GEONET_RETRY_MAX_WAIT";

/// Settings shared by every request a client makes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is resolved against.
    pub base_url: Url,
    /// Time budget for a single attempt.
    pub timeout: Duration,
    /// Retries allowed after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_min_wait: Duration,
    /// Upper bound on any single retry delay.
    pub retry_max_wait: Duration,
    /// Randomize each delay within `[50%, 100%]` of its computed value.
    pub jitter: bool,
    /// Let a server-sent `Retry-After` override the computed delay.
    pub honor_retry_after: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_min_wait: Duration::from_secs(4),
            retry_max_wait: Duration::from_secs(10),
            jitter: false,
            honor_retry_after: true,
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the defaults overlaid with `GEONET_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = Url::parse(url.trim())?;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT) {
            config.timeout = parse_seconds(ENV_TIMEOUT, &secs)?;
        }
        if let Some(count) = lookup(ENV_RETRIES) {
            config.max_retries = count.trim().parse().map_err(|e| {
                Error::Configuration(format!("{ENV_RETRIES}={count:?} is not a count: {e}"))
            })?;
        }
        if let Some(secs) = lookup(ENV_RETRY_MIN_WAIT) {
            config.retry_min_wait = parse_seconds(ENV_RETRY_MIN_WAIT, &secs)?;
        }
        if let Some(secs) = lookup(ENV_RETRY_MAX_WAIT) {
            config.retry_max_wait = parse_seconds(ENV_RETRY_MAX_WAIT, &secs)?;
        }

        Ok(config)
    }

    /// Checks the invariants a client relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a zero timeout, inverted retry
    /// bounds, or a base URL that cannot have paths joined onto it.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::Configuration("timeout must be non-zero".into()));
        }
        if self.retry_min_wait > self.retry_max_wait {
            return Err(Error::Configuration(format!(
                "retry_min_wait ({:?}) exceeds retry_max_wait ({:?})",
                self.retry_min_wait, self.retry_max_wait
            )));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "{} cannot be used as a base URL",
                self.base_url
            )));
        }
        Ok(())
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!("default base URL is valid"))
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| Error::Configuration(format!("{key}={raw:?} is not a number: {e}")))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|e| Error::Configuration(format!("{key}={raw:?} is not a valid duration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_min_wait, Duration::from_secs(4));
        assert_eq!(config.retry_max_wait, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "http://localhost:8080/geonet/"),
            (ENV_TIMEOUT, "2.5"),
            (ENV_RETRIES, "5"),
            (ENV_RETRY_MIN_WAIT, "0.1"),
            (ENV_RETRY_MAX_WAIT, "1"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:8080/geonet/");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_min_wait, Duration::from_millis(100));
        assert_eq!(config.retry_max_wait, Duration::from_secs(1));
    }

    #[test]
    fn test_unparseable_environment_is_a_configuration_error() {
        let result = ClientConfig::from_lookup(lookup_from(&[(ENV_RETRIES, "many")]));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = ClientConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT, "-3")]));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "not a url")]));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = ClientConfig {
            retry_min_wait: Duration::from_secs(20),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let config = ClientConfig {
            timeout: Duration::ZERO,
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }
}
