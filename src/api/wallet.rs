//! Wallet endpoints.

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioRequest {
    /// Stake or payment address.
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTradesRequest {
    pub address: String,
    /// Restrict to one token.
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTrendedRequest {
    pub address: String,
    /// `24h`, `7d`, `30d`, `90d`, `180d`, `1y`, `all`.
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
}

/// Wallet endpoints. Obtain through [`Client::wallet`].
#[derive(Debug, Clone, Copy)]
pub struct Wallet<'a> {
    client: &'a Client,
}

impl<'a> Wallet<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /wallet/portfolio/positions`
    pub async fn portfolio_positions(&self, request: &PortfolioRequest) -> Result<Value> {
        self.client.get("/wallet/portfolio/positions", request).await
    }

    /// `GET /wallet/trades/tokens`
    pub async fn token_trades(&self, request: &WalletTradesRequest) -> Result<Value> {
        self.client.get("/wallet/trades/tokens", request).await
    }

    /// `GET /wallet/value/trended`: portfolio value over time.
    pub async fn value_trended(&self, request: &ValueTrendedRequest) -> Result<Value> {
        self.client.get("/wallet/value/trended", request).await
    }
}
