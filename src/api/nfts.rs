//! NFT endpoints.

use crate::{Client, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single NFT within a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRequest {
    /// Collection policy id.
    pub policy: String,
    /// Asset name, as displayed.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTraitsRequest {
    pub policy: String,
    pub name: String,
    /// `1` to include trait floor prices.
    #[serde(default)]
    pub prices: Option<String>,
}

/// A request identified by collection policy id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRequest {
    pub policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionAssetsRequest {
    pub policy: String,
    /// `price` or `rank`.
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    /// `1` for listed assets only.
    #[serde(default)]
    pub on_sale: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionHoldersRequest {
    pub policy: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    /// `1` to leave marketplace contracts out of the ranking.
    #[serde(default)]
    pub exclude_exchanges: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionTradesRequest {
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub min_amount: Option<u64>,
    #[serde(default, rename = "from")]
    pub from_ts: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCollectionsRequest {
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeRequest {
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// A collection plus an optional timeframe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTimeframeRequest {
    pub policy: String,
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// A collection sampled over fixed intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRequest {
    pub policy: String,
    /// `3m`, `5m`, `15m`, `30m`, `1h`, `2h`, `4h`, `12h`, `1d`, `3d`, `1w` or `1M`.
    pub interval: String,
    #[serde(default)]
    pub num_intervals: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingsDepthRequest {
    pub policy: String,
    /// Price points to return, at most 1000.
    #[serde(default)]
    pub items: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualListingsRequest {
    pub policy: String,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitPricesRequest {
    pub policy: String,
    /// Restricts prices to the traits of one asset.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceStatsRequest {
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub marketplace: Option<String>,
    /// `1` for yesterday's figures only.
    #[serde(default)]
    pub last_day: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTimeframeRequest {
    /// `marketCap`, `volume`, `gainers` or `losers`.
    pub ranking: String,
    #[serde(default)]
    pub items: Option<u32>,
}

/// NFT endpoints. Obtain through [`Client::nfts`].
#[derive(Debug, Clone, Copy)]
pub struct Nfts<'a> {
    client: &'a Client,
}

impl<'a> Nfts<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /nft/asset/sales`: sale history of one NFT.
    pub async fn asset_sales(&self, request: &AssetRequest) -> Result<Value> {
        self.client.get("/nft/asset/sales", request).await
    }

    /// `GET /nft/asset/stats`
    pub async fn asset_stats(&self, request: &AssetRequest) -> Result<Value> {
        self.client.get("/nft/asset/stats", request).await
    }

    /// `GET /nft/asset/traits`
    pub async fn asset_traits(&self, request: &AssetTraitsRequest) -> Result<Value> {
        self.client.get("/nft/asset/traits", request).await
    }

    /// `GET /nft/collection/info`: name, logo and socials.
    pub async fn collection_info(&self, request: &PolicyRequest) -> Result<Value> {
        self.client.get("/nft/collection/info", request).await
    }

    /// `GET /nft/collection/stats`: floor, volume, supply, listings.
    pub async fn collection_stats(&self, request: &PolicyRequest) -> Result<Value> {
        self.client.get("/nft/collection/stats", request).await
    }

    /// `GET /nft/collection/assets`
    pub async fn collection_assets(&self, request: &CollectionAssetsRequest) -> Result<Value> {
        self.client.get("/nft/collection/assets", request).await
    }

    /// `GET /nft/collection/holders/top`
    pub async fn collection_top_holders(&self, request: &CollectionHoldersRequest) -> Result<Value> {
        self.client.get("/nft/collection/holders/top", request).await
    }

    /// `GET /nft/collection/trades`
    pub async fn collection_trades(&self, request: &CollectionTradesRequest) -> Result<Value> {
        self.client.get("/nft/collection/trades", request).await
    }

    /// `GET /nft/collection/listings`
    pub async fn collection_listings(&self, request: &PolicyRequest) -> Result<Value> {
        self.client.get("/nft/collection/listings", request).await
    }

    /// `GET /nft/top/volume`
    pub async fn top_volume(&self, request: &TopCollectionsRequest) -> Result<Value> {
        self.client.get("/nft/top/volume", request).await
    }

    /// `GET /nft/market/stats`
    pub async fn market_stats(&self, request: &TimeframeRequest) -> Result<Value> {
        self.client.get("/nft/market/stats", request).await
    }

    /// `GET /nft/collection/holders/distribution`: holders bucketed by
    /// quantity held.
    pub async fn collection_holders_distribution(&self, request: &PolicyRequest) -> Result<Value> {
        self.client
            .get("/nft/collection/holders/distribution", request)
            .await
    }

    /// `GET /nft/collection/holders/trended`
    pub async fn collection_holders_trended(
        &self,
        request: &PolicyTimeframeRequest,
    ) -> Result<Value> {
        self.client.get("/nft/collection/holders/trended", request).await
    }

    /// `GET /nft/collection/listings/depth`: cumulative listings by price.
    pub async fn collection_listings_depth(&self, request: &ListingsDepthRequest) -> Result<Value> {
        self.client.get("/nft/collection/listings/depth", request).await
    }

    /// `GET /nft/collection/listings/individual`
    pub async fn collection_individual_listings(
        &self,
        request: &IndividualListingsRequest,
    ) -> Result<Value> {
        self.client
            .get("/nft/collection/listings/individual", request)
            .await
    }

    /// `GET /nft/collection/listings/trended`
    pub async fn collection_listings_trended(&self, request: &IntervalRequest) -> Result<Value> {
        self.client.get("/nft/collection/listings/trended", request).await
    }

    /// `GET /nft/collection/ohlcv`: floor price candles.
    pub async fn collection_ohlcv(&self, request: &IntervalRequest) -> Result<Value> {
        self.client.get("/nft/collection/ohlcv", request).await
    }

    /// `GET /nft/collection/stats/extended`: stats with percent changes.
    pub async fn collection_stats_extended(
        &self,
        request: &PolicyTimeframeRequest,
    ) -> Result<Value> {
        self.client.get("/nft/collection/stats/extended", request).await
    }

    /// `GET /nft/collection/trades/stats`
    pub async fn collection_trade_stats(&self, request: &PolicyTimeframeRequest) -> Result<Value> {
        self.client.get("/nft/collection/trades/stats", request).await
    }

    /// `GET /nft/collection/traits/price`: floor price per trait.
    pub async fn collection_trait_prices(&self, request: &TraitPricesRequest) -> Result<Value> {
        self.client.get("/nft/collection/traits/price", request).await
    }

    /// `GET /nft/collection/traits/rarity`
    pub async fn collection_trait_rarity(&self, request: &PolicyRequest) -> Result<Value> {
        self.client.get("/nft/collection/traits/rarity", request).await
    }

    /// `GET /nft/collection/traits/rarity/rank`
    pub async fn collection_rarity_rank(&self, request: &AssetRequest) -> Result<Value> {
        self.client
            .get("/nft/collection/traits/rarity/rank", request)
            .await
    }

    /// `GET /nft/collection/volume/trended`
    pub async fn collection_volume_trended(&self, request: &IntervalRequest) -> Result<Value> {
        self.client.get("/nft/collection/volume/trended", request).await
    }

    /// `GET /nft/market/stats/extended`
    pub async fn market_stats_extended(&self, request: &TimeframeRequest) -> Result<Value> {
        self.client.get("/nft/market/stats/extended", request).await
    }

    /// `GET /nft/market/volume/trended`
    pub async fn market_volume_trended(&self, request: &TimeframeRequest) -> Result<Value> {
        self.client.get("/nft/market/volume/trended", request).await
    }

    /// `GET /nft/marketplace/stats`: volume and fees per marketplace.
    pub async fn marketplace_stats(&self, request: &MarketplaceStatsRequest) -> Result<Value> {
        self.client.get("/nft/marketplace/stats", request).await
    }

    /// `GET /nft/top/timeframe`: top collections by one ranking.
    pub async fn top_timeframe(&self, request: &TopTimeframeRequest) -> Result<Value> {
        self.client.get("/nft/top/timeframe", request).await
    }

    /// `GET /nft/top/volume/extended`
    pub async fn top_volume_extended(&self, request: &TopCollectionsRequest) -> Result<Value> {
        self.client.get("/nft/top/volume/extended", request).await
    }
}
