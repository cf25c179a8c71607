//! On-chain lookups.

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSupplyRequest {
    pub unit: String,
}

/// Either `address` or `payment_cred` identifies the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfoRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub payment_cred: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUtxosRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub payment_cred: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionUtxosRequest {
    /// Transaction hash.
    pub hash: String,
}

/// On-chain endpoints. Obtain through [`Client::onchain`].
#[derive(Debug, Clone, Copy)]
pub struct Onchain<'a> {
    client: &'a Client,
}

impl<'a> Onchain<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /asset/supply`
    pub async fn asset_supply(&self, request: &AssetSupplyRequest) -> Result<Value> {
        self.client.get("/asset/supply", request).await
    }

    /// `GET /address/info`: lovelace balance, assets and stake address.
    pub async fn address_info(&self, request: &AddressInfoRequest) -> Result<Value> {
        self.client.get("/address/info", request).await
    }

    /// `GET /address/utxos`
    pub async fn address_utxos(&self, request: &AddressUtxosRequest) -> Result<Value> {
        self.client.get("/address/utxos", request).await
    }

    /// `GET /transaction/utxos`
    pub async fn transaction_utxos(&self, request: &TransactionUtxosRequest) -> Result<Value> {
        self.client.get("/transaction/utxos", request).await
    }
}
