//! Structured errors for TapTools API calls.
//!
//! Every failure that leaves the transport is a single [`Error`] value: a
//! category ([`ErrorKind`]), a human-readable message, the HTTP status when
//! the failure came from a response, a retry hint for rate limits, and a
//! typed diagnostic payload. Raw `reqwest` or `serde_json` errors never
//! escape; they are kept as the error's source.

use crate::rate_limit::RetryAfter;
use crate::retry::DEFAULT_RETRYABLE_STATUSES;
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime};

/// Maximum number of characters of a raw response body kept for diagnostics.
pub const MAX_DIAGNOSTIC_TEXT: usize = 1000;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Protocol-level error codes surfaced to tool callers.
///
/// One fixed code per [`ErrorKind`], plus [`INVALID_PARAMS`](code::INVALID_PARAMS)
/// for tool arguments that fail to decode before any request is made.
pub mod code {
    /// Invalid or unauthorized API key.
    pub const AUTHENTICATION: i32 = -32001;
    /// The API could not be reached.
    pub const CONNECTION: i32 = -32002;
    /// The API rejected the request parameters.
    pub const VALIDATION: i32 = -32003;
    /// Anything not covered by a more specific code.
    pub const API_ERROR: i32 = -32004;
    /// Too many requests.
    pub const RATE_LIMIT: i32 = -32005;
    /// The requested resource does not exist.
    pub const NOT_FOUND: i32 = -32006;
    /// Tool arguments could not be decoded.
    pub const INVALID_PARAMS: i32 = -32007;
    /// The request timed out.
    pub const TIMEOUT: i32 = -32008;
    /// A successful response carried a body that is not valid JSON.
    pub const PARSE: i32 = -32009;
    /// Upstream 5xx.
    pub const SERVER: i32 = -32010;
    /// Upstream 502.
    pub const BAD_GATEWAY: i32 = -32011;
    /// Upstream 503.
    pub const SERVICE_UNAVAILABLE: i32 = -32012;

    /// JSON-RPC: the message was not valid JSON.
    pub const JSONRPC_PARSE_ERROR: i32 = -32700;
    /// JSON-RPC: not a valid request object.
    pub const JSONRPC_INVALID_REQUEST: i32 = -32600;
    /// JSON-RPC: unknown method or tool.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// JSON-RPC: malformed method parameters.
    pub const JSONRPC_INVALID_PARAMS: i32 = -32602;
}

/// The category of a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 401 or 403.
    Authentication,
    /// Connection refused, DNS failure, reset, or a broken body stream.
    Connection,
    /// 400 and any other unmatched 4xx.
    Validation,
    /// 429.
    RateLimit,
    /// 404.
    NotFound,
    /// 408, or the per-attempt timeout elapsed.
    Timeout,
    /// A non-error response whose body is not valid JSON.
    Parse,
    /// 5xx not covered by a more specific kind.
    Server,
    /// 502.
    BadGateway,
    /// 503.
    ServiceUnavailable,
    /// Everything else.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Maps an HTTP status onto a category. First match wins:
    ///
    /// | status | kind |
    /// |---|---|
    /// | 400 | `Validation` |
    /// | 401, 403 | `Authentication` |
    /// | 404 | `NotFound` |
    /// | 408 | `Timeout` |
    /// | 429 | `RateLimit` |
    /// | 502 | `BadGateway` |
    /// | 503 | `ServiceUnavailable` |
    /// | 500..=598 | `Server` |
    /// | 4xx | `Validation` |
    /// | anything else | `Unknown` |
    ///
    /// # Examples
    ///
    /// ```
    /// use taptools_mcp::ErrorKind;
    /// use http::StatusCode;
    ///
    /// assert_eq!(ErrorKind::from_status(StatusCode::UNAUTHORIZED), ErrorKind::Authentication);
    /// assert_eq!(ErrorKind::from_status(StatusCode::IM_A_TEAPOT), ErrorKind::Validation);
    /// ```
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => ErrorKind::Validation,
            401 | 403 => ErrorKind::Authentication,
            404 => ErrorKind::NotFound,
            408 => ErrorKind::Timeout,
            429 => ErrorKind::RateLimit,
            502 => ErrorKind::BadGateway,
            503 => ErrorKind::ServiceUnavailable,
            500..=598 => ErrorKind::Server,
            400..=499 => ErrorKind::Validation,
            _ => ErrorKind::Unknown,
        }
    }

    /// The protocol error code for this category.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::Authentication => code::AUTHENTICATION,
            ErrorKind::Connection => code::CONNECTION,
            ErrorKind::Validation => code::VALIDATION,
            ErrorKind::RateLimit => code::RATE_LIMIT,
            ErrorKind::NotFound => code::NOT_FOUND,
            ErrorKind::Timeout => code::TIMEOUT,
            ErrorKind::Parse => code::PARSE,
            ErrorKind::Server => code::SERVER,
            ErrorKind::BadGateway => code::BAD_GATEWAY,
            ErrorKind::ServiceUnavailable => code::SERVICE_UNAVAILABLE,
            ErrorKind::Unknown => code::API_ERROR,
        }
    }

    /// The machine-readable name, e.g. `rate_limit`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::Connection => "connection",
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Parse => "parse",
            ErrorKind::Server => "server",
            ErrorKind::BadGateway => "bad_gateway",
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value in an error's diagnostic payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailValue {
    /// Free text.
    Text(String),
    /// A JSON number, integers kept exact.
    Number(serde_json::Number),
    /// A nested map.
    Map(Details),
}

/// Diagnostic payload attached to an [`Error`]. Keys are kept sorted so the
/// serialized form is deterministic.
pub type Details = BTreeMap<String, DetailValue>;

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::Text(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        match serde_json::Number::from_f64(value) {
            Some(n) => DetailValue::Number(n),
            None => DetailValue::Text(value.to_string()),
        }
    }
}

impl From<u16> for DetailValue {
    fn from(value: u16) -> Self {
        DetailValue::Number(value.into())
    }
}

impl From<u64> for DetailValue {
    fn from(value: u64) -> Self {
        DetailValue::Number(value.into())
    }
}

impl From<Details> for DetailValue {
    fn from(value: Details) -> Self {
        DetailValue::Map(value)
    }
}

impl DetailValue {
    /// Converts a JSON value. `null` has no representation and yields `None`;
    /// booleans and arrays are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::String(s) => Some(DetailValue::Text(s.clone())),
            Value::Number(n) => Some(DetailValue::Number(n.clone())),
            Value::Object(map) => Some(DetailValue::Map(
                map.iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
            Value::Bool(_) | Value::Array(_) => Some(DetailValue::Text(value.to_string())),
        }
    }
}

/// The normalized failure of a logical call.
///
/// # Examples
///
/// ```no_run
/// use taptools_mcp::{Client, ErrorKind, RequestOptions};
/// use http::Method;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder()
///     .base_url("https://openapi.taptools.io/api/v1")?
///     .api_key("my-key")
///     .build()?;
///
/// match client.execute(Method::GET, "/token/mcap", RequestOptions::new()).await {
///     Ok(value) => println!("{value}"),
///     Err(e) if e.kind() == ErrorKind::RateLimit => {
///         println!("slow down, retry after {:?}", e.retry_after());
///     }
///     Err(e) => println!("{} ({:?})", e, e.status()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<StatusCode>,
    retry_after: Option<RetryAfter>,
    details: Details,
    request: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error with no HTTP origin.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            status: None,
            retry_after: None,
            details: Details::new(),
            request: None,
            source: None,
        }
    }

    /// Classifies a failed HTTP response. See [`classify`].
    pub fn from_http_response(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        classify(status, headers, body, None)
    }

    /// Normalizes a transport failure from the HTTP client.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let (kind, message) = if err.is_timeout() {
            (ErrorKind::Timeout, format!("Request timed out: {}", err))
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_decode() {
            (ErrorKind::Connection, format!("Network error: {}", err))
        } else {
            (ErrorKind::Unknown, format!("Unexpected error: {}", err))
        };
        Self::new(kind, message).with_source(err)
    }

    /// A successful response whose body could not be parsed as JSON.
    pub fn parse(err: serde_json::Error, raw_body: &str) -> Self {
        Self::new(ErrorKind::Parse, "Invalid JSON response from API")
            .with_detail("serde_error", err.to_string())
            .with_detail("response_text", truncate(raw_body))
            .with_source(err)
    }

    /// Attaches a diagnostic entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Attaches the underlying low-level failure.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Records which request produced this error, e.g. `GET /token/mcap`.
    pub fn with_request(mut self, method: &Method, path: &str) -> Self {
        self.request = Some(format!("{} {}", method, path));
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The originating HTTP status, present only for HTTP failures.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The earliest time a retry should be attempted, for rate limits that
    /// carried a `Retry-After` header.
    pub fn retry_after(&self) -> Option<SystemTime> {
        self.retry_after.map(|hint| hint.not_before)
    }

    /// The upstream-requested wait, relative to when the response arrived.
    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_after.map(|hint| hint.delay)
    }

    /// The diagnostic payload.
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// The request descriptor, if one was attached.
    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    /// Returns `true` for timeouts, connection failures, and the transient
    /// statuses 408, 429, 500, 502, 503 and 504.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            Some(status) => DEFAULT_RETRYABLE_STATUSES.contains(&status.as_u16()),
            None => matches!(self.kind, ErrorKind::Timeout | ErrorKind::Connection),
        }
    }

    /// Converts into the `(code, message)` pair exposed to tool callers.
    ///
    /// The message is the base message, then the HTTP status, then the retry
    /// time for rate limits, then the diagnostic payload as JSON.
    pub fn to_protocol_error(&self) -> ProtocolError {
        let mut message = self.message.clone();

        if let Some(status) = self.status {
            message.push_str(&format!(" (HTTP {})", status.as_u16()));
        }

        if let Some(at) = self.retry_after() {
            message.push_str(&format!(" - retry after {}", httpdate::fmt_http_date(at)));
        }

        if !self.details.is_empty() {
            if let Ok(json) = serde_json::to_string(&self.details) {
                message.push_str(&format!(" - details: {}", json));
            }
        }

        ProtocolError::new(self.kind.code(), message)
    }
}

/// Builds the structured error for a failed HTTP response.
///
/// The category comes from [`ErrorKind::from_status`]. The message is, in
/// order of preference: `override_message`; `"<error>: <message>"` from a
/// JSON body; `"HTTP <code>: <text>"` from the raw body (truncated to
/// [`MAX_DIAGNOSTIC_TEXT`] characters); a generic phrase naming the status.
/// Rate limits also pick up the `Retry-After` hint.
///
/// Performs no I/O and cannot fail.
pub fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    override_message: Option<String>,
) -> Error {
    classify_at(status, headers, body, override_message, SystemTime::now())
}

pub(crate) fn classify_at(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    override_message: Option<String>,
    now: SystemTime,
) -> Error {
    let kind = ErrorKind::from_status(status);
    let json = serde_json::from_str::<serde_json::Value>(body).ok();

    let message = override_message
        .or_else(|| json.as_ref().and_then(|v| describe_json_body(v, status)))
        .unwrap_or_else(|| describe_text_body(body, status));

    let mut details = Details::new();
    match json.as_ref().and_then(DetailValue::from_json) {
        Some(DetailValue::Map(map)) => details = map,
        Some(other) => {
            details.insert("response".to_string(), other);
        }
        None if !body.trim().is_empty() => {
            details.insert("response_text".to_string(), truncate(body).into());
        }
        None => {}
    }

    let retry_after = match kind {
        ErrorKind::RateLimit => RetryAfter::from_headers(headers, now),
        _ => None,
    };

    Error {
        message,
        kind,
        status: Some(status),
        retry_after,
        details,
        request: None,
        source: None,
    }
}

fn describe_json_body(body: &serde_json::Value, status: StatusCode) -> Option<String> {
    let object = body.as_object()?;
    let error = object.get("error").map(json_text);
    let message = object.get("message").map(json_text);

    if error.is_none() && message.is_none() {
        return None;
    }

    Some(format!(
        "{}: {}",
        error.unwrap_or_else(|| "Unknown error".to_string()),
        message.unwrap_or_else(|| status.as_u16().to_string())
    ))
}

fn describe_text_body(body: &str, status: StatusCode) -> String {
    let text = body.trim();
    if text.is_empty() {
        format!("HTTP {}: No error details available", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), truncate(text))
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keeps at most [`MAX_DIAGNOSTIC_TEXT`] characters.
pub(crate) fn truncate(text: &str) -> String {
    text.chars().take(MAX_DIAGNOSTIC_TEXT).collect()
}

/// An error as exposed to the tool-hosting protocol: a numeric code and a
/// display message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message} (code {code})")]
pub struct ProtocolError {
    /// One of the constants in [`code`], or a JSON-RPC reserved code.
    pub code: i32,
    /// The final display message.
    pub message: String,
}

impl ProtocolError {
    /// Creates a protocol error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Prefixes the message with the name of the tool that failed.
    pub fn in_tool(mut self, tool: &str) -> Self {
        self.message = format!("[{}] {}", tool, self.message);
        self
    }
}

impl From<&Error> for ProtocolError {
    fn from(err: &Error) -> Self {
        err.to_protocol_error()
    }
}

impl From<Error> for ProtocolError {
    fn from(err: Error) -> Self {
        err.to_protocol_error()
    }
}

/// A specialized `Result` type for TapTools API calls.
pub type Result<T> = std::result::Result<T, Error>;
