//! Prints a short market snapshot from the live TapTools API.
//!
//! Requires `TAPTOOLS_API_KEY` in the environment or a `.env` file.
//!
//! Run with: `cargo run --example market_snapshot`

use taptools_mcp::api::market::MarketStatsRequest;
use taptools_mcp::api::tokens::TopVolumeRequest;
use taptools_mcp::{Client, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("taptools_mcp=info")
        .init();

    let config = Config::from_env()?;
    let client = Client::from_config(&config)?;

    let connection = client.verify_connection().await?;
    println!("Connection: {}", connection["status"]);

    let stats = client
        .market()
        .stats(&MarketStatsRequest {
            quote: Some("USD".to_string()),
        })
        .await?;
    println!("Market stats: {}", serde_json::to_string_pretty(&stats)?);

    let top = client
        .tokens()
        .top_volume(&TopVolumeRequest {
            timeframe: Some("24h".to_string()),
            page: Some(1),
            per_page: Some(5),
        })
        .await;

    match top {
        Ok(tokens) => {
            for token in tokens.as_array().into_iter().flatten() {
                println!("  {:<10} {}", token["ticker"], token["volume"]);
            }
        }
        Err(e) => {
            let protocol = e.to_protocol_error();
            eprintln!("Top volume failed [{}]: {}", protocol.code, protocol.message);
        }
    }

    Ok(())
}
