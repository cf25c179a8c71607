//! `Retry-After` handling for rate-limited responses.
//!
//! The header carries either a delay in whole seconds or an HTTP-date. Both
//! forms are captured against a single "now" so the relative delay and the
//! absolute retry time always agree.

use http::{header::RETRY_AFTER, HeaderMap};
use std::time::{Duration, SystemTime};

/// A retry hint supplied by the upstream API on a 429 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfter {
    /// The earliest moment a retry should be issued.
    pub not_before: SystemTime,

    /// How long to wait, relative to when the response was observed.
    ///
    /// Never negative: a date in the past yields `Duration::ZERO`.
    pub delay: Duration,
}

impl RetryAfter {
    /// Extracts the hint from response headers.
    ///
    /// Returns `None` when the header is missing, not valid ASCII, or in
    /// neither of the two supported forms.
    ///
    /// # Examples
    ///
    /// ```
    /// use taptools_mcp::rate_limit::RetryAfter;
    /// use http::HeaderMap;
    /// use std::time::{Duration, SystemTime};
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "5".parse().unwrap());
    ///
    /// let hint = RetryAfter::from_headers(&headers, SystemTime::now()).unwrap();
    /// assert_eq!(hint.delay, Duration::from_secs(5));
    /// ```
    pub fn from_headers(headers: &HeaderMap, now: SystemTime) -> Option<Self> {
        let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
        Self::parse(value, now)
    }

    /// Parses a raw `Retry-After` value.
    ///
    /// Accepts delay-seconds (ASCII digits only) or an HTTP-date such as
    /// `Wed, 21 Oct 2015 07:28:00 GMT`.
    pub fn parse(value: &str, now: SystemTime) -> Option<Self> {
        let value = value.trim();

        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            let delay = Duration::from_secs(value.parse::<u64>().ok()?);
            return Some(Self {
                not_before: now.checked_add(delay)?,
                delay,
            });
        }

        let not_before = httpdate::parse_http_date(value).ok()?;
        let delay = not_before.duration_since(now).unwrap_or(Duration::ZERO);
        Some(Self { not_before, delay })
    }
}
