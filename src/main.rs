//! TapTools MCP server.
//!
//! Speaks line-delimited JSON-RPC on stdin/stdout. Logs go to stderr and are
//! filtered with `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use taptools_mcp::{server::Server, tools::Tools, Client, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the protocol.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env().context("Failed to start TapTools server")?;

    info!(
        base_url = %config.base_url,
        timeout_secs = config.timeout.as_secs(),
        max_attempts = config.retry.max_attempts(),
        "Starting TapTools MCP server"
    );

    let client = Client::from_config(&config).context("Failed to create TapTools client")?;
    let server = Server::new(Tools::new(client));

    server.serve_stdio().await?;

    Ok(())
}
