//! Exchange market types: currency pairs and ticker snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Currency;

/// A tradable market on the exchange, identified by base and quote currency.
///
/// The exchange names markets by concatenating both codes in lowercase,
/// so `BTC/NGN` is looked up as `btcngn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketPair {
    /// Base currency (the one being priced).
    pub base: Currency,
    /// Quote currency (the pricing currency).
    pub quote: Currency,
}

impl MarketPair {
    /// Create a new market pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }

    /// Market symbol used in exchange URLs, e.g. `btcngn`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base.market_code(), self.quote.market_code())
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol())
    }
}

/// Market statistics snapshot as published by the exchange.
///
/// Values are kept as the decimal strings the exchange sends and are only
/// parsed when a caller needs them. The exchange uses abbreviated field
/// names (`vol`, `last`, `sell`, `buy`) on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(default)]
    pub low: String,
    #[serde(default)]
    pub high: String,
    #[serde(default)]
    pub open: String,
    /// Traded volume.
    #[serde(rename = "vol", default)]
    pub volume: String,
    /// Last traded price.
    #[serde(rename = "last", default)]
    pub price: String,
    /// Best ask (lowest sell order).
    #[serde(rename = "sell", default)]
    pub ask: String,
    /// Best bid (highest buy order).
    #[serde(rename = "buy", default)]
    pub bid: String,
}

impl Ticker {
    /// Create a ticker that only carries a last traded price.
    pub fn with_price(price: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            ..Default::default()
        }
    }

    /// Last traded price as an exact decimal.
    pub fn last_price(&self) -> Result<Decimal, rust_decimal::Error> {
        Decimal::from_str(self.price.trim())
    }
}
