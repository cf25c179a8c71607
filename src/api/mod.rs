//! TapTools endpoint groups.
//!
//! Each group borrows a [`Client`] and exposes one method per REST resource.
//! Request structs serialize to query parameters (camelCase, `None` fields
//! omitted) and double as tool argument schemas, so they also deserialize.
//!
//! ```no_run
//! use taptools_mcp::{api::tokens::UnitRequest, Client};
//!
//! # async fn example(client: Client) -> taptools_mcp::Result<()> {
//! let mcap = client
//!     .tokens()
//!     .mcap(&UnitRequest { unit: "8fef2d34078659c2".to_string() })
//!     .await?;
//! println!("{}", mcap["mcap"]);
//! # Ok(())
//! # }
//! ```

pub mod integration;
pub mod market;
pub mod nfts;
pub mod onchain;
pub mod tokens;
pub mod wallet;

use crate::{Client, Error, ErrorKind, Result};
use serde_json::{json, Value};

pub use integration::Integration;
pub use market::Market;
pub use nfts::Nfts;
pub use onchain::Onchain;
pub use tokens::Tokens;
pub use wallet::Wallet;

impl Client {
    /// Token prices, market caps, holders and trading data.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens::new(self)
    }

    /// NFT collection and asset statistics.
    pub fn nfts(&self) -> Nfts<'_> {
        Nfts::new(self)
    }

    /// Market-wide aggregates.
    pub fn market(&self) -> Market<'_> {
        Market::new(self)
    }

    /// Integration endpoints: assets, blocks, events, exchanges, pairs.
    pub fn integration(&self) -> Integration<'_> {
        Integration::new(self)
    }

    /// Raw on-chain lookups.
    pub fn onchain(&self) -> Onchain<'_> {
        Onchain::new(self)
    }

    /// Wallet portfolios and history.
    pub fn wallet(&self) -> Wallet<'_> {
        Wallet::new(self)
    }

    /// Checks that the API key is accepted by listing the available quote
    /// currencies.
    ///
    /// # Errors
    ///
    /// Returns the structured error of the underlying call, typically
    /// [`ErrorKind::Authentication`] for a bad key.
    pub async fn verify_connection(&self) -> Result<Value> {
        let quotes = self.tokens().available_quotes().await?;

        if !quotes.is_array() {
            return Err(Error::new(
                ErrorKind::Parse,
                "Unexpected response from /token/quote/available",
            )
            .with_detail("response_text", quotes.to_string()));
        }

        Ok(json!({
            "status": "connected",
            "available_quotes": quotes,
        }))
    }
}
