//! Per-request options.

use crate::{Error, ErrorKind, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

/// Everything about a single logical call besides its method and path.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Query parameters, in the order they will be sent.
    pub query: Vec<(String, String)>,

    /// JSON request body.
    pub body: Option<Value>,

    /// Headers added on top of the client's defaults.
    pub headers: HeaderMap,

    /// Whether transient failures may be retried. Disable for calls that
    /// must not be repeated.
    pub retry: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            retry: true,
        }
    }
}

impl RequestOptions {
    /// Options with no parameters and retry enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends every field of a serializable struct as a query parameter.
    ///
    /// `None`/`null` fields are skipped and sequences are sent comma-joined.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `params` does not serialize to a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use taptools_mcp::RequestOptions;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// #[serde(rename_all = "camelCase")]
    /// struct Page { page: u32, per_page: Option<u32> }
    ///
    /// let options = RequestOptions::new()
    ///     .with_query(&Page { page: 2, per_page: None })
    ///     .unwrap();
    /// assert_eq!(options.query, vec![("page".to_string(), "2".to_string())]);
    /// ```
    pub fn with_query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self> {
        let value = serde_json::to_value(params).map_err(|e| {
            Error::new(
                ErrorKind::Validation,
                format!("Failed to serialize query parameters: {}", e),
            )
            .with_source(e)
        })?;

        match value {
            Value::Object(map) => {
                self.query.extend(
                    map.into_iter()
                        .filter_map(|(key, value)| query_value(value).map(|value| (key, value))),
                );
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(Error::new(
                ErrorKind::Validation,
                format!("Query parameters must be an object, got {}", other),
            )),
        }
    }

    /// Sets the JSON body.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `body` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            Error::new(
                ErrorKind::Validation,
                format!("Failed to serialize request body: {}", e),
            )
            .with_source(e)
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Adds a header for this request only.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref()).map_err(|e| {
            Error::new(ErrorKind::Validation, format!("Invalid header name: {}", e))
        })?;
        let value = HeaderValue::try_from(value.as_ref()).map_err(|e| {
            Error::new(ErrorKind::Validation, format!("Invalid header value: {}", e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Makes exactly one attempt regardless of the client's retry policy.
    pub fn without_retry(mut self) -> Self {
        self.retry = false;
        self
    }
}

fn query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
