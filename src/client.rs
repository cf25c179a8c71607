//! HTTP client with retry logic and structured errors.
//!
//! The [`Client`] type is the transport for every TapTools endpoint. Use
//! [`ClientBuilder`] to configure it, or [`Client::from_config`] to build one
//! from a loaded [`Config`](crate::Config).

use crate::config::{Config, ConfigError};
use crate::retry::{RetryDecision, RetryPolicy, Sleeper, TokioSleeper};
use crate::{Error, RequestOptions, Result};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A TapTools API client.
///
/// Cheap to clone; clones share one connection pool and one immutable
/// configuration. Concurrent calls each run their own retry loop.
///
/// # Examples
///
/// ```no_run
/// use taptools_mcp::{Client, RequestOptions};
/// use http::Method;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder()
///     .base_url("https://openapi.taptools.io/api/v1")?
///     .api_key("my-key")
///     .build()?;
///
/// let options = RequestOptions::new().with_query_param("unit", "8fef2d34078659c2");
/// let mcap = client.execute(Method::GET, "/token/mcap", options).await?;
/// println!("{}", mcap["mcap"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    retry_policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("retry_policy", &self.inner.retry_policy)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Builds a client from process configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or API key cannot be used.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Self::builder()
            .base_url(&config.base_url)?
            .api_key(&config.api_key)
            .timeout(config.timeout)
            .retry_policy(config.retry.clone())
            .build()
    }

    /// The retry policy applied to every call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry_policy
    }

    /// Executes one logical call and returns the parsed JSON body.
    ///
    /// Transient failures (timeouts, connection errors, and the policy's
    /// retryable statuses) are retried up to the policy's attempt cap, sleeping
    /// between attempts. Any status of 400 or above is a failure. A successful
    /// response whose body is not JSON fails immediately with
    /// [`ErrorKind::Parse`](crate::ErrorKind::Parse).
    ///
    /// # Errors
    ///
    /// Every failure is returned as a structured [`Error`] carrying the
    /// request descriptor.
    pub async fn execute(&self, method: Method, path: &str, options: RequestOptions) -> Result<Value> {
        let policy = &self.inner.retry_policy;
        let mut attempt = 0;

        loop {
            attempt += 1;

            tracing::debug!(
                method = %method,
                path = path,
                attempt = attempt,
                max_attempts = policy.max_attempts(),
                "Executing TapTools request"
            );

            let error = match self.attempt(&method, path, &options).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let decision = if options.retry {
                policy.decide(attempt, &error)
            } else {
                RetryDecision::stop()
            };

            if decision.should_retry {
                tracing::warn!(
                    error = %error,
                    kind = %error.kind(),
                    status = error.status().map(|s| s.as_u16()),
                    attempt = attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = decision.delay.as_millis(),
                    "Request failed, retrying after delay"
                );
                self.inner.sleeper.sleep(decision.delay).await;
                continue;
            }

            tracing::error!(
                error = %error,
                kind = %error.kind(),
                status = error.status().map(|s| s.as_u16()),
                attempts = attempt,
                method = %method,
                path = path,
                "Request failed"
            );

            return Err(error.with_request(&method, path));
        }
    }

    /// Executes a call and deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus a parse error if the JSON does not
    /// match `T`.
    pub async fn execute_as<T>(&self, method: Method, path: &str, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let value = self.execute(method.clone(), path, options).await?;
        let raw = value.to_string();
        serde_json::from_value(value)
            .map_err(|e| Error::parse(e, &raw).with_request(&method, path))
    }

    /// GET with query parameters taken from `params`.
    pub async fn get<P>(&self, path: &str, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let options = RequestOptions::new()
            .with_query(params)
            .map_err(|e| e.with_request(&Method::GET, path))?;
        self.execute(Method::GET, path, options).await
    }

    /// POST with a JSON body.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new()
            .with_json(body)
            .map_err(|e| e.with_request(&Method::POST, path))?;
        self.execute(Method::POST, path, options).await
    }

    /// Executes a single attempt.
    async fn attempt(&self, method: &Method, path: &str, options: &RequestOptions) -> Result<Value> {
        let url = self.endpoint_url(path);

        let mut request = self.inner.http_client.request(method.clone(), url);

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }

        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(Error::from_transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let raw_body = response.text().await.map_err(Error::from_transport)?;

        if status.as_u16() >= 400 {
            let error = Error::from_http_response(status, &headers, &raw_body);

            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    kind = %error.kind(),
                    message = %error,
                    "API error response (4xx)"
                );
            } else {
                tracing::warn!(
                    status = status.as_u16(),
                    kind = %error.kind(),
                    message = %error,
                    "API error response (5xx)"
                );
            }

            return Err(error);
        }

        tracing::debug!(status = status.as_u16(), bytes = raw_body.len(), "Received response");

        serde_json::from_str(&raw_body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JSON response");
            Error::parse(e, &raw_body)
        })
    }

    /// Appends `path` to the base URL's own path.
    fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use taptools_mcp::{ClientBuilder, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), taptools_mcp::ConfigError> {
/// let client = ClientBuilder::new()
///     .base_url("https://openapi.taptools.io/api/v1")?
///     .api_key("my-key")
///     .timeout(Duration::from_secs(10))
///     .retry_policy(RetryPolicy::default().with_max_attempts(5))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    default_headers: HeaderMap,
    retry_policy: RetryPolicy,
    timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("retry_policy", &self.retry_policy)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            default_headers: HeaderMap::new(),
            retry_policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Sets the base URL. Request paths are appended to its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> std::result::Result<Self, ConfigError> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the key sent as `Authorization: Bearer <key>`.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> std::result::Result<Self, ConfigError> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| ConfigError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| ConfigError::InvalidHeader(e.to_string()))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces how the client waits between attempts.
    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided, the API key is not a
    /// valid header value, or the HTTP client cannot be created.
    pub fn build(self) -> std::result::Result<Client, ConfigError> {
        let base_url = self.base_url.ok_or(ConfigError::MissingBaseUrl)?;

        let mut headers = self.default_headers;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(api_key) = self.api_key {
            let mut value = HeaderValue::try_from(format!("Bearer {}", api_key))
                .map_err(|e| ConfigError::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                retry_policy: self.retry_policy,
                sleeper: self.sleeper,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
