//! Integration endpoints, shaped for DEX aggregators and indexers.

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request identified by an opaque id (asset unit, exchange id, pair id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

/// Exactly one of `number` or `timestamp` should be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRequest {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsRequest {
    pub from_block: u64,
    pub to_block: u64,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAssetsRequest {
    /// Policy id.
    pub id: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Integration endpoints. Obtain through [`Client::integration`].
#[derive(Debug, Clone, Copy)]
pub struct Integration<'a> {
    client: &'a Client,
}

impl<'a> Integration<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /integration/asset`
    pub async fn asset(&self, request: &IdRequest) -> Result<Value> {
        self.client.get("/integration/asset", request).await
    }

    /// `GET /integration/block`
    pub async fn block(&self, request: &BlockRequest) -> Result<Value> {
        self.client.get("/integration/block", request).await
    }

    /// `GET /integration/events`: swaps and liquidity events in a block range.
    pub async fn events(&self, request: &EventsRequest) -> Result<Value> {
        self.client.get("/integration/events", request).await
    }

    /// `GET /integration/exchange`
    pub async fn exchange(&self, request: &IdRequest) -> Result<Value> {
        self.client.get("/integration/exchange", request).await
    }

    /// `GET /integration/latest-block`
    pub async fn latest_block(&self) -> Result<Value> {
        self.client.get("/integration/latest-block", &()).await
    }

    /// `GET /integration/pair`
    pub async fn pair(&self, request: &IdRequest) -> Result<Value> {
        self.client.get("/integration/pair", request).await
    }

    /// `GET /integration/policy/assets`
    pub async fn policy_assets(&self, request: &PolicyAssetsRequest) -> Result<Value> {
        self.client.get("/integration/policy/assets", request).await
    }
}
