//! Process configuration.
//!
//! Values come from the environment, optionally seeded from a `.env` file.

use crate::client::DEFAULT_TIMEOUT;
use crate::retry::RetryPolicy;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// The public TapTools API.
pub const DEFAULT_BASE_URL: &str = "https://openapi.taptools.io/api/v1";

/// Required: the TapTools API key.
pub const API_KEY_VAR: &str = "TAPTOOLS_API_KEY";
/// Optional: override the API base URL.
pub const BASE_URL_VAR: &str = "TAPTOOLS_BASE_URL";
/// Optional: per-attempt timeout in seconds.
pub const TIMEOUT_VAR: &str = "TAPTOOLS_TIMEOUT_SECS";
/// Optional: total attempts per call.
pub const MAX_ATTEMPTS_VAR: &str = "TAPTOOLS_MAX_ATTEMPTS";
/// Optional: linear backoff unit in milliseconds.
pub const RETRY_BASE_DELAY_VAR: &str = "TAPTOOLS_RETRY_BASE_DELAY_MS";

/// Configuration and client-construction errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// No usable API key was found.
    #[error("TAPTOOLS_API_KEY not found. Please set it in .env or environment.")]
    MissingApiKey,

    /// A numeric variable did not parse.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue {
        /// The variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },

    /// The client was built without a base URL.
    #[error("Base URL is required")]
    MissingBaseUrl,

    /// The base URL did not parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value was rejected.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The underlying HTTP client could not be created.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// The `.env` file exists but could not be read.
    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Settings for the TapTools client and server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Sent as a bearer token.
    pub api_key: String,
    /// API root; endpoint paths are appended to it.
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Retry policy for every call.
    pub retry: RetryPolicy,
}

impl Config {
    /// A configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Loads `.env` from the working directory if present, then reads the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if the key is absent or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::from_vars(std::env::vars())
    }

    /// Reads variables from a specific dotenv file, with the process
    /// environment taking precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the key is missing.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut vars = dotenvy::from_path_iter(path.as_ref())?.collect::<Result<Vec<_>, _>>()?;
        vars.extend(std::env::vars().filter(|(name, _)| name.starts_with("TAPTOOLS_")));
        Self::from_vars(vars)
    }

    /// Builds a configuration from name/value pairs. Later pairs win.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or a numeric value is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use taptools_mcp::Config;
    ///
    /// let config = Config::from_vars([
    ///     ("TAPTOOLS_API_KEY".to_string(), "secret".to_string()),
    ///     ("TAPTOOLS_TIMEOUT_SECS".to_string(), "10".to_string()),
    /// ])
    /// .unwrap();
    /// assert_eq!(config.api_key, "secret");
    /// assert_eq!(config.timeout.as_secs(), 10);
    /// ```
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut api_key = None;
        let mut base_url = None;
        let mut timeout = None;
        let mut max_attempts = None;
        let mut base_delay = None;

        for (name, value) in vars {
            match name.as_str() {
                API_KEY_VAR => api_key = Some(value),
                BASE_URL_VAR => base_url = Some(value),
                TIMEOUT_VAR => timeout = Some(parse_positive(TIMEOUT_VAR, &value)?),
                MAX_ATTEMPTS_VAR => {
                    max_attempts = Some(parse_number::<usize>(MAX_ATTEMPTS_VAR, &value)?)
                }
                RETRY_BASE_DELAY_VAR => {
                    base_delay = Some(parse_number::<u64>(RETRY_BASE_DELAY_VAR, &value)?)
                }
                _ => {}
            }
        }

        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);

        if let Some(url) = base_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            config.base_url = url;
        }
        if let Some(secs) = timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = max_attempts {
            config.retry = config.retry.with_max_attempts(attempts);
        }
        if let Some(ms) = base_delay {
            config.retry = config.retry.with_base_delay(Duration::from_millis(ms));
        }

        Ok(config)
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

/// Like `parse_number`, but zero is rejected.
fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match parse_number(name, value)? {
        0 => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(vars(&[("TAPTOOLS_API_KEY", "test-api-key")])).unwrap();

        assert_eq!(config.api_key, "test-api-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_from_vars_missing_key() {
        let err = Config::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains("TAPTOOLS_API_KEY not found"));
    }

    #[test]
    fn test_from_vars_blank_key() {
        let err = Config::from_vars(vars(&[("TAPTOOLS_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("TAPTOOLS_API_KEY not found"));
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = Config::from_vars(vars(&[
            ("TAPTOOLS_API_KEY", " key "),
            ("TAPTOOLS_BASE_URL", "http://localhost:9000/api"),
            ("TAPTOOLS_TIMEOUT_SECS", "5"),
            ("TAPTOOLS_MAX_ATTEMPTS", "4"),
            ("TAPTOOLS_RETRY_BASE_DELAY_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts(), 4);
        assert_eq!(config.retry.base_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_vars_invalid_number() {
        let err = Config::from_vars(vars(&[
            ("TAPTOOLS_API_KEY", "key"),
            ("TAPTOOLS_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: TIMEOUT_VAR, .. }
        ));
    }

    #[test]
    fn test_from_vars_rejects_zero_timeout() {
        let err = Config::from_vars(vars(&[
            ("TAPTOOLS_API_KEY", "key"),
            ("TAPTOOLS_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: TIMEOUT_VAR, ref value } if value == "0"
        ));
    }

    #[test]
    fn test_from_vars_max_attempts_out_of_range() {
        let err = Config::from_vars(vars(&[
            ("TAPTOOLS_API_KEY", "key"),
            ("TAPTOOLS_MAX_ATTEMPTS", "99999999999999999999999"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: MAX_ATTEMPTS_VAR, .. }
        ));
    }

    #[test]
    fn test_from_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "TAPTOOLS_API_KEY=test-api-key-from-file").unwrap();
        writeln!(file, "UNRELATED=1").unwrap();

        let config = Config::from_env_file(file.path());

        // The process environment wins if a developer has a key exported.
        if std::env::var(API_KEY_VAR).is_err() {
            assert_eq!(config.unwrap().api_key, "test-api-key-from-file");
        }
    }
}
