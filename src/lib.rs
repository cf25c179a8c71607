//! # taptools-mcp
//!
//! A client for the TapTools Cardano market-data API, and an MCP server that
//! exposes its endpoints as tools.
//!
//! The core is the transport: every call goes through [`Client::execute`],
//! which sends the request, retries transient failures with linear backoff
//! (honoring `Retry-After` on 429), and turns every failure into one
//! structured [`Error`] with a fixed [`ErrorKind`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use taptools_mcp::{api::tokens::UnitRequest, Client, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = Client::from_config(&config)?;
//!
//!     let holders = client
//!         .tokens()
//!         .holders(&UnitRequest { unit: "8fef2d34078659c2".to_string() })
//!         .await?;
//!     println!("{}", holders["holders"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Errors keep the HTTP status, the parsed `Retry-After` time, and a bounded
//! diagnostic payload from the response body:
//!
//! ```no_run
//! use taptools_mcp::{Client, ErrorKind, RequestOptions};
//! use http::Method;
//!
//! # async fn example(client: Client) {
//! match client.execute(Method::GET, "/token/mcap", RequestOptions::new()).await {
//!     Ok(body) => println!("{}", body),
//!     Err(e) if e.kind() == ErrorKind::RateLimit => {
//!         eprintln!("rate limited, retry in {:?}", e.retry_delay());
//!     }
//!     Err(e) => {
//!         let protocol = e.to_protocol_error();
//!         eprintln!("{} ({})", protocol.message, protocol.code);
//!     }
//! }
//! # }
//! ```
//!
//! ## Retry Policy
//!
//! ```no_run
//! use taptools_mcp::{Client, RetryPolicy};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), taptools_mcp::ConfigError> {
//! let client = Client::builder()
//!     .base_url("https://openapi.taptools.io/api/v1")?
//!     .api_key("my-key")
//!     .retry_policy(
//!         RetryPolicy::default()
//!             .with_max_attempts(5)
//!             .with_base_delay(Duration::from_millis(500)),
//!     )
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
mod client;
mod config;
pub mod error;
pub mod rate_limit;
mod request;
pub mod retry;
pub mod server;
pub mod tools;

pub use client::{Client, ClientBuilder, DEFAULT_TIMEOUT};
pub use config::{Config, ConfigError, DEFAULT_BASE_URL};
pub use error::{classify, DetailValue, Details, Error, ErrorKind, ProtocolError, Result};
pub use request::RequestOptions;
pub use retry::{RetryDecision, RetryPolicy, Sleeper, TokioSleeper};
