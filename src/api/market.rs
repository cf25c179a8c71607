//! Market-wide endpoints.

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStatsRequest {
    /// Quote currency, defaults to ADA upstream.
    #[serde(default)]
    pub quote: Option<String>,
}

/// Market endpoints. Obtain through [`Client::market`].
#[derive(Debug, Clone, Copy)]
pub struct Market<'a> {
    client: &'a Client,
}

impl<'a> Market<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /market/stats`: 24h DEX volume and active addresses.
    pub async fn stats(&self, request: &MarketStatsRequest) -> Result<Value> {
        self.client.get("/market/stats", request).await
    }

    /// `GET /metrics`: daily API request counts for this key.
    pub async fn metrics(&self) -> Result<Value> {
        self.client.get("/metrics", &()).await
    }
}
