//! Token endpoints.

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request identified by a single token unit (policy id + hex name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRequest {
    /// Token unit.
    pub unit: String,
}

/// Paged request for a single token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHoldersRequest {
    pub unit: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// `POST /token/prices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricesRequest {
    /// Token units to price.
    pub units: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChangesRequest {
    pub unit: String,
    /// Comma-delimited, e.g. `1h,24h,7d`.
    #[serde(default)]
    pub timeframes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Quote currency, e.g. `USD`.
    #[serde(default)]
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorsRequest {
    pub unit: String,
    pub interval: String,
    #[serde(default)]
    pub items: Option<u32>,
    /// One of `ma`, `ema`, `rsi`, `macd`, `bb`, `bbw`.
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
}

/// Either `unit` or `onchain_id` identifies the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OhlcvRequest {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub onchain_id: Option<String>,
    pub interval: String,
    #[serde(default)]
    pub num_intervals: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolsRequest {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub onchain_id: Option<String>,
    /// `1` to list ADA pairs only.
    #[serde(default)]
    pub ada_only: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingStatsRequest {
    pub unit: String,
    /// `24h`, `7d`, `30d`...
    #[serde(default)]
    pub timeframe: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesRequest {
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Minimum trade size in lovelace.
    #[serde(default)]
    pub min_amount: Option<u64>,
    /// Only trades after this UNIX timestamp.
    #[serde(default, rename = "from")]
    pub from_ts: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMcapRequest {
    /// `mcap` or `fdv`.
    #[serde(default, rename = "type")]
    pub ranking: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopVolumeRequest {
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Shared by the P2P loan and offer endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRequest {
    pub unit: String,
    /// e.g. `collateral,debt`.
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Token endpoints. Obtain through [`Client::tokens`].
#[derive(Debug, Clone, Copy)]
pub struct Tokens<'a> {
    client: &'a Client,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /token/mcap`: supply, price, market cap and FDV.
    pub async fn mcap(&self, request: &UnitRequest) -> Result<Value> {
        self.client.get("/token/mcap", request).await
    }

    /// `GET /token/holders`: total holder count.
    pub async fn holders(&self, request: &UnitRequest) -> Result<Value> {
        self.client.get("/token/holders", request).await
    }

    /// `GET /token/holders/top`
    pub async fn top_holders(&self, request: &TopHoldersRequest) -> Result<Value> {
        self.client.get("/token/holders/top", request).await
    }

    /// `POST /token/prices`: aggregated DEX price for each unit.
    pub async fn prices(&self, request: &PricesRequest) -> Result<Value> {
        self.client.post("/token/prices", &request.units).await
    }

    /// `GET /token/prices/chg`
    pub async fn price_changes(&self, request: &PriceChangesRequest) -> Result<Value> {
        self.client.get("/token/prices/chg", request).await
    }

    /// `GET /token/quote`: current price of a quote currency.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<Value> {
        self.client.get("/token/quote", request).await
    }

    /// `GET /token/quote/available`
    pub async fn available_quotes(&self) -> Result<Value> {
        self.client.get("/token/quote/available", &()).await
    }

    /// `GET /token/indicators`
    pub async fn indicators(&self, request: &IndicatorsRequest) -> Result<Value> {
        self.client.get("/token/indicators", request).await
    }

    /// `GET /token/links`: social and website links.
    pub async fn links(&self, request: &UnitRequest) -> Result<Value> {
        self.client.get("/token/links", request).await
    }

    /// `GET /token/ohlcv`
    pub async fn ohlcv(&self, request: &OhlcvRequest) -> Result<Value> {
        self.client.get("/token/ohlcv", request).await
    }

    /// `GET /token/pools`: active liquidity pools.
    pub async fn pools(&self, request: &PoolsRequest) -> Result<Value> {
        self.client.get("/token/pools", request).await
    }

    /// `GET /token/trading/stats`
    pub async fn trading_stats(&self, request: &TradingStatsRequest) -> Result<Value> {
        self.client.get("/token/trading/stats", request).await
    }

    /// `GET /token/trades`
    pub async fn trades(&self, request: &TradesRequest) -> Result<Value> {
        self.client.get("/token/trades", request).await
    }

    /// `GET /token/top/mcap`
    pub async fn top_mcap(&self, request: &TopMcapRequest) -> Result<Value> {
        self.client.get("/token/top/mcap", request).await
    }

    /// `GET /token/top/volume`
    pub async fn top_volume(&self, request: &TopVolumeRequest) -> Result<Value> {
        self.client.get("/token/top/volume", request).await
    }

    /// `GET /token/top/liquidity`
    pub async fn top_liquidity(&self, request: &PageRequest) -> Result<Value> {
        self.client.get("/token/top/liquidity", request).await
    }

    /// `GET /token/debt/loans`: active P2P loans using the token.
    pub async fn debt_loans(&self, request: &DebtRequest) -> Result<Value> {
        self.client.get("/token/debt/loans", request).await
    }

    /// `GET /token/debt/offers`: open P2P loan offers.
    pub async fn debt_offers(&self, request: &DebtRequest) -> Result<Value> {
        self.client.get("/token/debt/offers", request).await
    }
}
