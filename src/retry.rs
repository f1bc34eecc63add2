//! Retry strategies and predicates for handling transient failures.
//!
//! [`RetryPolicy`] owns the whole classify-then-retry decision. It drives any
//! async operation, so the loop can be exercised with a simulated transport
//! in tests without an HTTP server.

use crate::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Defines when and how to retry failed requests.
///
/// # Examples
///
/// ```
/// use gnet::RetryStrategy;
/// use std::time::Duration;
///
/// // 4s, 8s, 10s, 10s...
/// let strategy = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_secs(4),
///     max_delay: Duration::from_secs(10),
///     max_retries: 3,
///     jitter: false,
/// };
/// assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_secs(10)));
/// assert_eq!(strategy.delay_for_attempt(4), None);
/// ```
#[derive(Debug, Clone, Default)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    #[default]
    None,

    /// Retry with exponentially increasing delays.
    ///
    /// Each retry waits for `initial_delay * 2^(attempt - 1)` (capped at `max_delay`).
    ExponentialBackoff {
        /// The delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between retries.
        max_delay: Duration,
        /// The number of retries allowed after the first attempt.
        max_retries: usize,
        /// Scale each delay by a random factor in `[0.5, 1.0]`.
        jitter: bool,
    },
}

impl RetryStrategy {
    /// Returns the delay before the given retry, or `None` if retries are exhausted.
    ///
    /// `attempt` is 1-indexed: 1 is the delay between the first and second attempts.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                max_retries,
                jitter,
            } => {
                if attempt == 0 || attempt > *max_retries {
                    return None;
                }

                let exponent = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
                let multiplier = 2u32.saturating_pow(exponent);
                let delay = initial_delay.saturating_mul(multiplier).min(*max_delay);

                if *jitter {
                    let factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(factor))
                } else {
                    Some(delay)
                }
            }
        }
    }

    /// Returns the number of retries allowed after the first attempt.
    pub fn max_retries(&self) -> usize {
        match self {
            RetryStrategy::None => 0,
            RetryStrategy::ExponentialBackoff { max_retries, .. } => *max_retries,
        }
    }

    /// Returns the upper bound on a single delay, if there is one.
    pub fn max_delay(&self) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff { max_delay, .. } => Some(*max_delay),
        }
    }
}

/// Decides whether a failed attempt should be retried.
///
/// # Examples
///
/// ```
/// use gnet::{Error, RetryPredicate};
///
/// struct OnlyTimeouts;
///
/// impl RetryPredicate for OnlyTimeouts {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         matches!(error, Error::Timeout { .. })
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the attempt that produced `error` should be retried.
    ///
    /// `attempt` is the 1-indexed number of the attempt that just failed.
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry every error that [`Error::is_retryable`] accepts.
///
/// This is the default: connection failures, timeouts and 5xx answers.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnRetryable;

impl RetryPredicate for RetryOnRetryable {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// A complete retry policy: backoff strategy, retry predicate and
/// `Retry-After` handling.
#[derive(Clone)]
pub struct RetryPolicy {
    strategy: RetryStrategy,
    predicate: Arc<dyn RetryPredicate>,
    honor_retry_after: bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("strategy", &self.strategy)
            .field("honor_retry_after", &self.honor_retry_after)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Creates a policy that retries [`Error::is_retryable`] failures using `strategy`.
    pub fn new(strategy: RetryStrategy) -> Self {
        Self {
            strategy,
            predicate: Arc::new(RetryOnRetryable),
            honor_retry_after: true,
        }
    }

    /// Replaces the retry predicate.
    pub fn with_predicate(mut self, predicate: Arc<dyn RetryPredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Sets whether a server-sent `Retry-After` overrides the computed backoff.
    pub fn honor_retry_after(mut self, honor: bool) -> Self {
        self.honor_retry_after = honor;
        self
    }

    /// Returns the backoff strategy.
    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or exhausts the allowed retries.
    ///
    /// The operation receives the 1-indexed attempt number. On success the
    /// value is returned together with the number of attempts it took.
    /// A retryable failure on the last allowed attempt becomes
    /// [`Error::ExhaustedRetries`] wrapping that failure; a non-retryable
    /// failure is returned unchanged and ends the loop immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use gnet::{Error, RetryPolicy, RetryStrategy};
    /// use std::time::Duration;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let policy = RetryPolicy::new(RetryStrategy::ExponentialBackoff {
    ///     initial_delay: Duration::from_millis(1),
    ///     max_delay: Duration::from_millis(5),
    ///     max_retries: 2,
    ///     jitter: false,
    /// });
    ///
    /// let (value, attempts) = policy
    ///     .run(|attempt| async move {
    ///         if attempt < 3 {
    ///             Err(Error::Timeout { endpoint: "/quake".into() })
    ///         } else {
    ///             Ok("shaken")
    ///         }
    ///     })
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!((value, attempts), ("shaken", 3));
    /// # }
    /// ```
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<(T, usize)>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match operation(attempt).await {
                Ok(value) => return Ok((value, attempt)),
                Err(e) => e,
            };

            if !self.predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            let Some(delay) = self.delay_after(&error, attempt) else {
                return Err(Error::ExhaustedRetries {
                    attempts: attempt,
                    last_error: Box::new(error),
                });
            };

            tracing::debug!(
                error = %error,
                attempt = attempt,
                delay_ms = delay.as_millis(),
                "Retrying request after delay"
            );

            tokio::time::sleep(delay).await;
        }
    }

    fn delay_after(&self, error: &Error, attempt: usize) -> Option<Duration> {
        let backoff = self.strategy.delay_for_attempt(attempt)?;

        match error.retry_after() {
            Some(requested) if self.honor_retry_after => {
                let cap = self.strategy.max_delay().unwrap_or(requested);
                Some(requested.min(cap))
            }
            _ => Some(backoff),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryStrategy::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_backoff(max_retries: usize) -> RetryStrategy {
        RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_retries,
            jitter: false,
        }
    }

    fn server_error() -> Error {
        Error::Server {
            endpoint: "/quake".into(),
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "busy".into(),
            retry_after: None,
        }
    }

    /// Fails with a retryable error for the first `failures` attempts.
    async fn flaky(calls: &AtomicUsize, failures: usize) -> Result<&'static str> {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n < failures {
            Err(server_error())
        } else {
            Ok("ok")
        }
    }

    #[test]
    fn test_exponential_backoff_delays() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            max_retries: 4,
            jitter: false,
        };

        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_secs(4)));
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_secs(8)));
        assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_secs(10)));
        assert_eq!(strategy.delay_for_attempt(4), Some(Duration::from_secs(10)));
        assert_eq!(strategy.delay_for_attempt(5), None);
        assert_eq!(strategy.max_retries(), 4);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            max_retries: 3,
            jitter: true,
        };

        for _ in 0..50 {
            let delay = strategy.delay_for_attempt(2).unwrap();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(200));
        }
    }

    #[test]
    fn test_no_retry() {
        let strategy = RetryStrategy::None;
        assert_eq!(strategy.delay_for_attempt(1), None);
        assert_eq!(strategy.max_retries(), 0);
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_with_two_retries() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::new(fast_backoff(2));

        let (value, attempts) = policy.run(|_| flaky(&calls, 2)).await.unwrap();

        assert_eq!(value, "ok");
        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_with_one_retry() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::new(fast_backoff(1));

        let result = policy.run(|_| flaky(&calls, 2)).await;

        match result {
            Err(Error::ExhaustedRetries {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last_error, Error::Server { .. }));
            }
            other => panic!("Expected ExhaustedRetries, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_short_circuits() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::new(fast_backoff(5));

        let result: Result<((), usize)> = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(Error::Client {
                        endpoint: "/quake/bogus".into(),
                        status: StatusCode::NOT_FOUND,
                        body: "not found".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(Error::Client { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_predicate_is_consulted() {
        struct Never;
        impl RetryPredicate for Never {
            fn should_retry(&self, _error: &Error, _attempt: usize) -> bool {
                false
            }
        }

        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::new(fast_backoff(3)).with_predicate(Arc::new(Never));

        let result = policy.run(|_| flaky(&calls, 1)).await;

        assert!(matches!(result, Err(Error::Server { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_after_is_capped_by_max_delay() {
        let policy = RetryPolicy::new(fast_backoff(2));
        let error = Error::Server {
            endpoint: "/quake".into(),
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
            retry_after: Some(Duration::from_secs(600)),
        };

        assert_eq!(policy.delay_after(&error, 1), Some(Duration::from_millis(4)));
        assert_eq!(policy.delay_after(&error, 3), None);

        let ignoring = RetryPolicy::new(fast_backoff(2)).honor_retry_after(false);
        assert_eq!(ignoring.delay_after(&error, 1), Some(Duration::from_millis(1)));
    }
}
