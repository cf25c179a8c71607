//! The tool catalogue exposed to MCP hosts.
//!
//! Every tool maps onto one endpoint-group method. Arguments are decoded into
//! the endpoint's request struct, the call runs through the shared
//! [`Client`], and results come back as pretty-printed JSON text. Failures are
//! converted to [`ProtocolError`]s whose message names the tool.

use crate::error::code;
use crate::{Client, Error, ProtocolError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// A tool as advertised in `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema for the `arguments` object.
    pub input_schema: Value,
}

/// Dispatches tool calls onto a [`Client`].
#[derive(Debug, Clone)]
pub struct Tools {
    client: Client,
}

impl Tools {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The full catalogue, in a stable order.
    pub fn definitions() -> Vec<ToolDefinition> {
        catalogue()
    }

    /// Runs a tool and returns its result as JSON text.
    ///
    /// Missing or `null` arguments are treated as an empty object.
    ///
    /// # Errors
    ///
    /// - [`code::METHOD_NOT_FOUND`] for an unknown tool name.
    /// - [`code::INVALID_PARAMS`] if the arguments do not match the tool's schema.
    /// - The code of the underlying [`Error`] for failed API calls.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String, ProtocolError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        tracing::debug!(tool = name, arguments = %arguments, "Calling tool");

        let result = self.dispatch(name, arguments).await?;

        match result {
            Ok(value) => {
                tracing::info!(tool = name, "Tool call succeeded");
                serde_json::to_string_pretty(&value)
                    .map_err(|e| ProtocolError::new(code::API_ERROR, e.to_string()).in_tool(name))
            }
            Err(error) => Err(report(name, &error)),
        }
    }

    /// The outer `Result` carries argument and lookup failures, the inner one
    /// the API call's outcome.
    async fn dispatch(
        &self,
        name: &str,
        args: Value,
    ) -> Result<crate::Result<Value>, ProtocolError> {
        let client = &self.client;

        let result = match name {
            // Tokens
            "get_token_mcap" => client.tokens().mcap(&decode(name, args)?).await,
            "get_token_holders" => client.tokens().holders(&decode(name, args)?).await,
            "get_token_holders_top" => client.tokens().top_holders(&decode(name, args)?).await,
            "get_token_prices" => client.tokens().prices(&decode(name, args)?).await,
            "get_token_price_changes" => client.tokens().price_changes(&decode(name, args)?).await,
            "get_quote_price" => client.tokens().quote(&decode(name, args)?).await,
            "get_available_quotes" => client.tokens().available_quotes().await,
            "get_token_indicators" => client.tokens().indicators(&decode(name, args)?).await,
            "get_token_links" => client.tokens().links(&decode(name, args)?).await,
            "get_token_ohlcv" => client.tokens().ohlcv(&decode(name, args)?).await,
            "get_token_pools" => client.tokens().pools(&decode(name, args)?).await,
            "get_token_trading_stats" => client.tokens().trading_stats(&decode(name, args)?).await,
            "get_token_trades" => client.tokens().trades(&decode(name, args)?).await,
            "get_top_tokens_by_mcap" => client.tokens().top_mcap(&decode(name, args)?).await,
            "get_top_tokens_by_volume" => client.tokens().top_volume(&decode(name, args)?).await,
            "get_top_tokens_by_liquidity" => {
                client.tokens().top_liquidity(&decode(name, args)?).await
            }
            "get_token_debt_loans" => client.tokens().debt_loans(&decode(name, args)?).await,
            "get_token_debt_offers" => client.tokens().debt_offers(&decode(name, args)?).await,

            // NFTs
            "get_nft_asset_sales" => client.nfts().asset_sales(&decode(name, args)?).await,
            "get_nft_asset_stats" => client.nfts().asset_stats(&decode(name, args)?).await,
            "get_nft_asset_traits" => client.nfts().asset_traits(&decode(name, args)?).await,
            "get_nft_collection_info" => client.nfts().collection_info(&decode(name, args)?).await,
            "get_nft_collection_stats" => {
                client.nfts().collection_stats(&decode(name, args)?).await
            }
            "get_nft_collection_assets" => {
                client.nfts().collection_assets(&decode(name, args)?).await
            }
            "get_nft_collection_holders_top" => {
                client.nfts().collection_top_holders(&decode(name, args)?).await
            }
            "get_nft_collection_trades" => {
                client.nfts().collection_trades(&decode(name, args)?).await
            }
            "get_nft_collection_listings" => {
                client.nfts().collection_listings(&decode(name, args)?).await
            }
            "get_nft_top_volume" => client.nfts().top_volume(&decode(name, args)?).await,
            "get_nft_market_stats" => client.nfts().market_stats(&decode(name, args)?).await,
            "get_nft_collection_holders_distribution" => {
                client.nfts().collection_holders_distribution(&decode(name, args)?).await
            }
            "get_nft_collection_holders_trended" => {
                client.nfts().collection_holders_trended(&decode(name, args)?).await
            }
            "get_nft_collection_listings_depth" => {
                client.nfts().collection_listings_depth(&decode(name, args)?).await
            }
            "get_nft_collection_listings_individual" => {
                client.nfts().collection_individual_listings(&decode(name, args)?).await
            }
            "get_nft_collection_listings_trended" => {
                client.nfts().collection_listings_trended(&decode(name, args)?).await
            }
            "get_nft_collection_ohlcv" => client.nfts().collection_ohlcv(&decode(name, args)?).await,
            "get_nft_collection_stats_extended" => {
                client.nfts().collection_stats_extended(&decode(name, args)?).await
            }
            "get_nft_collection_trade_stats" => {
                client.nfts().collection_trade_stats(&decode(name, args)?).await
            }
            "get_nft_collection_traits_price" => {
                client.nfts().collection_trait_prices(&decode(name, args)?).await
            }
            "get_nft_collection_traits_rarity" => {
                client.nfts().collection_trait_rarity(&decode(name, args)?).await
            }
            "get_nft_collection_traits_rarity_rank" => {
                client.nfts().collection_rarity_rank(&decode(name, args)?).await
            }
            "get_nft_collection_volume_trended" => {
                client.nfts().collection_volume_trended(&decode(name, args)?).await
            }
            "get_nft_market_stats_extended" => {
                client.nfts().market_stats_extended(&decode(name, args)?).await
            }
            "get_nft_market_volume_trended" => {
                client.nfts().market_volume_trended(&decode(name, args)?).await
            }
            "get_nft_marketplace_stats" => {
                client.nfts().marketplace_stats(&decode(name, args)?).await
            }
            "get_nft_top_timeframe" => client.nfts().top_timeframe(&decode(name, args)?).await,
            "get_nft_top_volume_extended" => {
                client.nfts().top_volume_extended(&decode(name, args)?).await
            }

            // Market
            "get_market_stats" => client.market().stats(&decode(name, args)?).await,
            "get_market_metrics" => client.market().metrics().await,

            // Integration
            "get_integration_asset" => client.integration().asset(&decode(name, args)?).await,
            "get_integration_block" => client.integration().block(&decode(name, args)?).await,
            "get_integration_events" => client.integration().events(&decode(name, args)?).await,
            "get_integration_exchange" => {
                client.integration().exchange(&decode(name, args)?).await
            }
            "get_integration_latest_block" => client.integration().latest_block().await,
            "get_integration_pair" => client.integration().pair(&decode(name, args)?).await,
            "get_policy_assets" => client.integration().policy_assets(&decode(name, args)?).await,

            // On-chain
            "get_asset_supply" => client.onchain().asset_supply(&decode(name, args)?).await,
            "get_address_info" => client.onchain().address_info(&decode(name, args)?).await,
            "get_address_utxos" => client.onchain().address_utxos(&decode(name, args)?).await,
            "get_transaction_utxos" => {
                client.onchain().transaction_utxos(&decode(name, args)?).await
            }

            // Wallet
            "get_wallet_portfolio_positions" => {
                client.wallet().portfolio_positions(&decode(name, args)?).await
            }
            "get_wallet_token_trades" => client.wallet().token_trades(&decode(name, args)?).await,
            "get_wallet_value_trended" => {
                client.wallet().value_trended(&decode(name, args)?).await
            }

            "verify_connection" => client.verify_connection().await,

            _ => {
                return Err(ProtocolError::new(
                    code::METHOD_NOT_FOUND,
                    format!("Unknown tool: {}", name),
                ))
            }
        };

        Ok(result)
    }
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(arguments).map_err(|e| {
        tracing::warn!(tool = tool, error = %e, "Invalid tool arguments");
        ProtocolError::new(code::INVALID_PARAMS, format!("Invalid arguments: {}", e)).in_tool(tool)
    })
}

/// Logs a failed call and converts it for the caller.
fn report(tool: &str, error: &Error) -> ProtocolError {
    tracing::error!(
        tool = tool,
        kind = %error.kind(),
        status = error.status().map(|s| s.as_u16()),
        request = error.request(),
        "API error in {}: {}",
        tool,
        error
    );

    if !error.details().is_empty() {
        tracing::debug!(tool = tool, details = ?error.details(), "Error details");
    }

    if let Some(delay) = error.retry_delay() {
        tracing::info!(
            tool = tool,
            retry_in_secs = delay.as_secs_f64(),
            "Rate limit will reset"
        );
    }

    ProtocolError::from(error).in_tool(tool)
}

/// Accumulates an object schema.
#[derive(Default)]
struct ObjectSchema {
    properties: Map<String, Value>,
    required: Vec<&'static str>,
}

impl ObjectSchema {
    fn required(mut self, name: &'static str, ty: &str, description: &str) -> Self {
        self.required.push(name);
        self.optional(name, ty, description)
    }

    fn optional(mut self, name: &'static str, ty: &str, description: &str) -> Self {
        let property = match ty {
            "string[]" => json!({
                "type": "array",
                "items": { "type": "string" },
                "description": description,
            }),
            _ => json!({ "type": ty, "description": description }),
        };
        self.properties.insert(name.to_string(), property);
        self
    }

    fn paged(self) -> Self {
        self.optional("page", "integer", "Page number, starting at 1")
            .optional("perPage", "integer", "Items per page (max 100)")
    }

    fn build(self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}

fn object() -> ObjectSchema {
    ObjectSchema::default()
}

fn tool(name: &'static str, description: &'static str, schema: ObjectSchema) -> ToolDefinition {
    ToolDefinition {
        name,
        description,
        input_schema: schema.build(),
    }
}

// Property names follow the serde names of the request structs in `api`.
const UNIT: &str = "Token unit (policy id + hex encoded name)";
const POLICY: &str = "Collection policy id";
const TIMEFRAME: &str = "Timeframe, e.g. 24h, 7d, 30d";

fn catalogue() -> Vec<ToolDefinition> {
    vec![
        // Tokens
        tool(
            "get_token_mcap",
            "Get token market cap info",
            object().required("unit", "string", UNIT),
        ),
        tool(
            "get_token_holders",
            "Get total number of token holders",
            object().required("unit", "string", UNIT),
        ),
        tool(
            "get_token_holders_top",
            "Get top token holders",
            object().required("unit", "string", UNIT).paged(),
        ),
        tool(
            "get_token_prices",
            "Get aggregated DEX prices for a list of tokens",
            object().required("units", "string[]", "Token units to price"),
        ),
        tool(
            "get_token_price_changes",
            "Get token price changes across timeframes",
            object()
                .required("unit", "string", UNIT)
                .optional("timeframes", "string", "Comma separated, e.g. 1h,4h,24h,7d,30d"),
        ),
        tool(
            "get_quote_price",
            "Get the current price of a quote currency",
            object().optional("quote", "string", "Quote currency, e.g. USD"),
        ),
        tool(
            "get_available_quotes",
            "List the available quote currencies",
            object(),
        ),
        tool(
            "get_token_indicators",
            "Get technical indicators for a token",
            object()
                .required("unit", "string", UNIT)
                .required("interval", "string", "Candle interval, e.g. 1h, 4h, 1d")
                .optional("items", "integer", "Number of values to return")
                .optional("indicator", "string", "One of ma, ema, rsi, macd, bb, bbw")
                .optional("quote", "string", "Quote currency"),
        ),
        tool(
            "get_token_links",
            "Get a token's website and social links",
            object().required("unit", "string", UNIT),
        ),
        tool(
            "get_token_ohlcv",
            "Get OHLCV candles for a token or pool",
            object()
                .optional("unit", "string", UNIT)
                .optional("onchainId", "string", "Pair onchain id, instead of unit")
                .required("interval", "string", "Candle interval, e.g. 1h, 4h, 1d")
                .optional("numIntervals", "integer", "Number of candles"),
        ),
        tool(
            "get_token_pools",
            "Get a token's active liquidity pools",
            object()
                .optional("unit", "string", UNIT)
                .optional("onchainId", "string", "Pool onchain id")
                .optional("adaOnly", "integer", "1 for ADA pairs only"),
        ),
        tool(
            "get_token_trading_stats",
            "Get buy/sell volume and trader counts for a token",
            object()
                .required("unit", "string", UNIT)
                .optional("timeframe", "string", TIMEFRAME),
        ),
        tool(
            "get_token_trades",
            "Get recent token trades",
            object()
                .optional("timeframe", "string", TIMEFRAME)
                .optional("sortBy", "string", "amount or time")
                .optional("order", "string", "asc or desc")
                .optional("unit", "string", UNIT)
                .optional("minAmount", "integer", "Minimum trade size in lovelace")
                .optional("from", "integer", "UNIX timestamp to start from")
                .paged(),
        ),
        tool(
            "get_top_tokens_by_mcap",
            "Get top tokens ranked by market cap",
            object()
                .optional("type", "string", "mcap or fdv")
                .paged(),
        ),
        tool(
            "get_top_tokens_by_volume",
            "Get top tokens ranked by trading volume",
            object().optional("timeframe", "string", TIMEFRAME).paged(),
        ),
        tool(
            "get_top_tokens_by_liquidity",
            "Get top tokens ranked by DEX liquidity",
            object().paged(),
        ),
        tool(
            "get_token_debt_loans",
            "Get active P2P loans using a token",
            debt_schema(),
        ),
        tool(
            "get_token_debt_offers",
            "Get open P2P loan offers for a token",
            debt_schema(),
        ),
        // NFTs
        tool(
            "get_nft_asset_sales",
            "Get NFT asset sales history",
            asset_schema(),
        ),
        tool("get_nft_asset_stats", "Get NFT asset stats", asset_schema()),
        tool(
            "get_nft_asset_traits",
            "Get NFT asset traits and rarity",
            asset_schema().optional("prices", "string", "1 to include trait prices"),
        ),
        tool(
            "get_nft_collection_info",
            "Get NFT collection info",
            object().required("policy", "string", POLICY),
        ),
        tool(
            "get_nft_collection_stats",
            "Get NFT collection stats",
            object().required("policy", "string", POLICY),
        ),
        tool(
            "get_nft_collection_assets",
            "List the assets of an NFT collection",
            object()
                .required("policy", "string", POLICY)
                .optional("sortBy", "string", "price or rank")
                .optional("order", "string", "asc or desc")
                .optional("search", "string", "Filter by asset name")
                .optional("onSale", "string", "1 for listed assets only")
                .paged(),
        ),
        tool(
            "get_nft_collection_holders_top",
            "Get the largest holders of an NFT collection",
            object()
                .required("policy", "string", POLICY)
                .optional("excludeExchanges", "integer", "1 to exclude marketplaces")
                .paged(),
        ),
        tool(
            "get_nft_collection_trades",
            "Get NFT trades, optionally for one collection",
            object()
                .optional("policy", "string", POLICY)
                .optional("timeframe", "string", TIMEFRAME)
                .optional("sortBy", "string", "amount or time")
                .optional("order", "string", "asc or desc")
                .optional("minAmount", "integer", "Minimum sale in lovelace")
                .optional("from", "integer", "UNIX timestamp to start from")
                .paged(),
        ),
        tool(
            "get_nft_collection_listings",
            "Get active listings of an NFT collection",
            object().required("policy", "string", POLICY),
        ),
        tool(
            "get_nft_top_volume",
            "Get top NFT collections by volume",
            object().optional("timeframe", "string", TIMEFRAME).paged(),
        ),
        tool(
            "get_nft_market_stats",
            "Get NFT market-wide stats",
            object().optional("timeframe", "string", TIMEFRAME),
        ),
        tool(
            "get_nft_collection_holders_distribution",
            "Get how many holders hold 1, 2-4, 5-9, 10-24 or 25+ NFTs of a collection",
            object().required("policy", "string", POLICY),
        ),
        tool(
            "get_nft_collection_holders_trended",
            "Get a collection's holder count over time",
            object()
                .required("policy", "string", POLICY)
                .optional("timeframe", "string", TIMEFRAME),
        ),
        tool(
            "get_nft_collection_listings_depth",
            "Get cumulative listings at each price point of a collection",
            object()
                .required("policy", "string", POLICY)
                .optional("items", "integer", "Price points to return (max 1000)"),
        ),
        tool(
            "get_nft_collection_listings_individual",
            "Get individual active listings of a collection",
            object()
                .required("policy", "string", POLICY)
                .optional("sortBy", "string", "price or time")
                .optional("order", "string", "asc or desc")
                .paged(),
        ),
        tool(
            "get_nft_collection_listings_trended",
            "Get a collection's listing count and floor over time",
            interval_schema(),
        ),
        tool(
            "get_nft_collection_ohlcv",
            "Get floor price OHLCV candles for a collection",
            interval_schema(),
        ),
        tool(
            "get_nft_collection_stats_extended",
            "Get collection stats with percent changes",
            object()
                .required("policy", "string", POLICY)
                .optional("timeframe", "string", TIMEFRAME),
        ),
        tool(
            "get_nft_collection_trade_stats",
            "Get a collection's buyers, sellers, sales and volume",
            object()
                .required("policy", "string", POLICY)
                .optional("timeframe", "string", TIMEFRAME),
        ),
        tool(
            "get_nft_collection_traits_price",
            "Get the floor price of every trait in a collection",
            object()
                .required("policy", "string", POLICY)
                .optional("name", "string", "Only the traits of this asset"),
        ),
        tool(
            "get_nft_collection_traits_rarity",
            "Get the rarity of every trait in a collection",
            object().required("policy", "string", POLICY),
        ),
        tool(
            "get_nft_collection_traits_rarity_rank",
            "Get the rarity rank of one NFT within its collection",
            asset_schema(),
        ),
        tool(
            "get_nft_collection_volume_trended",
            "Get a collection's volume and sales over time",
            interval_schema(),
        ),
        tool(
            "get_nft_market_stats_extended",
            "Get NFT market-wide stats with percent changes",
            object().optional("timeframe", "string", TIMEFRAME),
        ),
        tool(
            "get_nft_market_volume_trended",
            "Get NFT market volume over time",
            object().optional("timeframe", "string", TIMEFRAME),
        ),
        tool(
            "get_nft_marketplace_stats",
            "Get volume, sales and fees per NFT marketplace",
            object()
                .optional("timeframe", "string", TIMEFRAME)
                .optional("marketplace", "string", "Only this marketplace, e.g. jpg.store")
                .optional("lastDay", "integer", "1 for yesterday only"),
        ),
        tool(
            "get_nft_top_timeframe",
            "Get top NFT collections by market cap, volume, gainers or losers",
            object()
                .required("ranking", "string", "marketCap, volume, gainers or losers")
                .optional("items", "integer", "Collections to return (max 100)"),
        ),
        tool(
            "get_nft_top_volume_extended",
            "Get top NFT collections by volume, with percent changes",
            object().optional("timeframe", "string", TIMEFRAME).paged(),
        ),
        // Market
        tool(
            "get_market_stats",
            "Get market-wide statistics",
            object().optional("quote", "string", "Quote currency, defaults to ADA"),
        ),
        tool(
            "get_market_metrics",
            "Get daily request counts from past 30 days",
            object(),
        ),
        // Integration
        tool(
            "get_integration_asset",
            "Get asset details by ID",
            object().required("id", "string", "Asset unit"),
        ),
        tool(
            "get_integration_block",
            "Get a block by number or timestamp",
            object()
                .optional("number", "integer", "Block height")
                .optional("timestamp", "integer", "UNIX timestamp"),
        ),
        tool(
            "get_integration_events",
            "Get swap and liquidity events in a block range",
            object()
                .required("fromBlock", "integer", "First block, inclusive")
                .required("toBlock", "integer", "Last block, inclusive")
                .optional("limit", "integer", "Maximum number of events"),
        ),
        tool(
            "get_integration_exchange",
            "Get exchange details by ID",
            object().required("id", "string", "Exchange id"),
        ),
        tool(
            "get_integration_latest_block",
            "Get the latest processed block",
            object(),
        ),
        tool(
            "get_integration_pair",
            "Get pair details by ID",
            object().required("id", "string", "Pair id"),
        ),
        tool(
            "get_policy_assets",
            "Get assets under a given policy ID.",
            object().required("id", "string", "Policy id").paged(),
        ),
        // On-chain
        tool(
            "get_asset_supply",
            "Get onchain asset supply",
            object().required("unit", "string", UNIT),
        ),
        tool(
            "get_address_info",
            "Get balance, assets and stake address of an address",
            address_schema(),
        ),
        tool(
            "get_address_utxos",
            "Get the UTxOs of an address",
            address_schema().paged(),
        ),
        tool(
            "get_transaction_utxos",
            "Get the inputs and outputs of a transaction",
            object().required("hash", "string", "Transaction hash"),
        ),
        // Wallet
        tool(
            "get_wallet_portfolio_positions",
            "Get a wallet's token, NFT and LP positions",
            object().required("address", "string", "Stake or payment address"),
        ),
        tool(
            "get_wallet_token_trades",
            "Get a wallet's token trade history",
            object()
                .required("address", "string", "Stake or payment address")
                .optional("unit", "string", UNIT)
                .paged(),
        ),
        tool(
            "get_wallet_value_trended",
            "Get a wallet's value over time",
            object()
                .required("address", "string", "Stake or payment address")
                .optional("timeframe", "string", "24h, 7d, 30d, 90d, 180d, 1y or all")
                .optional("quote", "string", "Quote currency"),
        ),
        tool(
            "verify_connection",
            "Verify TapTools API authentication",
            object(),
        ),
    ]
}

fn debt_schema() -> ObjectSchema {
    object()
        .required("unit", "string", UNIT)
        .optional("include", "string", "Comma separated, e.g. collateral,debt")
        .optional("sortBy", "string", "time or expiration")
        .optional("order", "string", "asc or desc")
        .paged()
}

fn asset_schema() -> ObjectSchema {
    object()
        .required("policy", "string", POLICY)
        .required("name", "string", "Asset name")
}

fn interval_schema() -> ObjectSchema {
    object()
        .required("policy", "string", POLICY)
        .required("interval", "string", "Interval, e.g. 1h, 4h, 1d, 1w")
        .optional("numIntervals", "integer", "Number of intervals")
}

fn address_schema() -> ObjectSchema {
    object()
        .optional("address", "string", "Bech32 address")
        .optional("paymentCred", "string", "Payment credential, instead of address")
}
