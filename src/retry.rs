//! Retry policy for transient failures.
//!
//! The decision whether to retry, and how long to wait, is a pure function
//! of the attempt number and the normalized [`Error`]. The client's loop only
//! acts on the resulting [`RetryDecision`].

use crate::{Error, ErrorKind};
use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Total attempts per logical call, including the first.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Multiplied by the attempt number to get the backoff delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Statuses that indicate a transient upstream condition.
pub const DEFAULT_RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Defines when and how long to wait before retrying a failed attempt.
///
/// Delays grow linearly: `base_delay * attempt`. A 429 response carrying a
/// parsable `Retry-After` header replaces the computed delay.
///
/// # Examples
///
/// ```
/// use taptools_mcp::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .with_max_attempts(5)
///     .with_base_delay(Duration::from_millis(250));
///
/// assert_eq!(policy.backoff(1), Duration::from_millis(250));
/// assert_eq!(policy.backoff(3), Duration::from_millis(750));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    retryable_statuses: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Sets the total number of attempts. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the linear backoff unit.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Replaces the set of statuses that may be retried.
    pub fn with_retryable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Total attempts per logical call.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// The linear backoff unit.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// The statuses that may be retried.
    pub fn retryable_statuses(&self) -> &BTreeSet<u16> {
        &self.retryable_statuses
    }

    /// The computed delay after the given failed attempt (1-indexed).
    pub fn backoff(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether the failure is of a transient kind, ignoring the attempt cap.
    ///
    /// Errors carrying an HTTP status are judged by status alone; the rest
    /// are retryable only for timeouts and connection failures.
    pub fn is_retryable(&self, error: &Error) -> bool {
        match error.status() {
            Some(status) => self.retryable_statuses.contains(&status.as_u16()),
            None => matches!(error.kind(), ErrorKind::Timeout | ErrorKind::Connection),
        }
    }

    /// Decides what to do after `attempt` (1-indexed) failed with `error`.
    pub fn decide(&self, attempt: usize, error: &Error) -> RetryDecision {
        if attempt >= self.max_attempts || !self.is_retryable(error) {
            return RetryDecision::stop();
        }

        let hinted = match error.status() {
            Some(status) if status.as_u16() == 429 => error.retry_delay(),
            _ => None,
        };

        RetryDecision::retry_after(hinted.unwrap_or_else(|| self.backoff(attempt)))
    }
}

/// The outcome of [`RetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    /// Whether another attempt should be made.
    pub should_retry: bool,
    /// How long to wait first. Zero when not retrying.
    pub delay: Duration,
}

impl RetryDecision {
    /// Give up and surface the error.
    pub fn stop() -> Self {
        Self {
            should_retry: false,
            delay: Duration::ZERO,
        }
    }

    /// Retry after waiting `delay`.
    pub fn retry_after(delay: Duration) -> Self {
        Self {
            should_retry: true,
            delay,
        }
    }
}

/// Suspends the calling task between attempts.
///
/// The client uses [`TokioSleeper`] unless another implementation is
/// supplied through [`ClientBuilder::sleeper`](crate::ClientBuilder::sleeper).
pub trait Sleeper: Send + Sync {
    /// Waits for `delay`.
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, StatusCode};

    fn http_error(code: u16) -> Error {
        Error::from_http_response(StatusCode::from_u16(code).unwrap(), &HeaderMap::new(), "")
    }

    fn rate_limited(retry_after: &'static str) -> Error {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static(retry_after));
        Error::from_http_response(StatusCode::TOO_MANY_REQUESTS, &headers, "")
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(3));
        assert!(policy.backoff(2) > policy.backoff(1));
    }

    #[test]
    fn test_retryable_statuses_retry_until_cap() {
        let policy = RetryPolicy::default();

        for code in DEFAULT_RETRYABLE_STATUSES {
            let err = http_error(code);
            let first = policy.decide(1, &err);
            let second = policy.decide(2, &err);

            assert!(first.should_retry, "status {}", code);
            assert!(second.should_retry, "status {}", code);
            assert!(!policy.decide(3, &err).should_retry, "status {}", code);
            if code != 429 {
                assert_eq!(first.delay, Duration::from_secs(1));
                assert_eq!(second.delay, Duration::from_secs(2));
            }
        }
    }

    #[test]
    fn test_other_statuses_never_retry() {
        let policy = RetryPolicy::default();

        for code in [400, 401, 403, 404, 405, 418, 422, 501, 505] {
            assert_eq!(policy.decide(1, &http_error(code)), RetryDecision::stop());
        }
    }

    #[test]
    fn test_transport_failures_retry() {
        let policy = RetryPolicy::default();

        let timeout = Error::new(ErrorKind::Timeout, "Request timed out");
        let refused = Error::new(ErrorKind::Connection, "Network error");
        let parse = Error::new(ErrorKind::Parse, "Invalid JSON response from API");

        assert_eq!(
            policy.decide(1, &timeout),
            RetryDecision::retry_after(Duration::from_secs(1))
        );
        assert_eq!(
            policy.decide(2, &refused),
            RetryDecision::retry_after(Duration::from_secs(2))
        );
        assert!(!policy.decide(1, &parse).should_retry);
    }

    #[test]
    fn test_retry_after_seconds_overrides_backoff() {
        let decision = RetryPolicy::default().decide(1, &rate_limited("5"));
        assert_eq!(decision, RetryDecision::retry_after(Duration::from_secs(5)));
    }

    #[test]
    fn test_retry_after_past_date_is_zero() {
        let decision =
            RetryPolicy::default().decide(2, &rate_limited("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(decision, RetryDecision::retry_after(Duration::ZERO));
    }

    #[test]
    fn test_unparsable_retry_after_falls_back() {
        let decision = RetryPolicy::default().decide(2, &rate_limited("whenever"));
        assert_eq!(decision, RetryDecision::retry_after(Duration::from_secs(2)));
    }

    #[test]
    fn test_custom_policy() {
        let policy = RetryPolicy::default()
            .with_max_attempts(5)
            .with_base_delay(Duration::from_millis(10))
            .with_retryable_statuses([503]);

        assert!(policy.decide(4, &http_error(503)).should_retry);
        assert!(!policy.decide(5, &http_error(503)).should_retry);
        assert!(!policy.decide(1, &http_error(500)).should_retry);
        assert_eq!(policy.decide(4, &http_error(503)).delay, Duration::from_millis(40));
    }

    #[test]
    fn test_none_policy_makes_one_attempt() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.decide(1, &http_error(503)).should_retry);
        assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts(), 1);
    }
}
