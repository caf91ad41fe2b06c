//! Market data provider trait and test double.

use async_trait::async_trait;
use cryptoconv_common::{MarketPair, Ticker};

use crate::error::FxResult;

/// Outcome of a ticker lookup for a single market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerLookup {
    /// The market exists and its current ticker was returned.
    Found(Ticker),
    /// The exchange has no such market in this orientation.
    NotFound,
}

impl TickerLookup {
    /// Get the ticker if the market was found.
    pub fn into_ticker(self) -> Option<Ticker> {
        match self {
            TickerLookup::Found(ticker) => Some(ticker),
            TickerLookup::NotFound => None,
        }
    }
}

/// Trait for market data sources.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the current ticker for a market.
    ///
    /// Performs exactly one upstream request. A missing market is reported as
    /// [`TickerLookup::NotFound`]; every other failure is an error.
    async fn fetch_ticker(&self, market: &MarketPair) -> FxResult<TickerLookup>;
}

/// In-memory market data provider for tests.
///
/// Records every requested market symbol so callers can assert on the
/// number and order of upstream lookups.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockMarketDataProvider {
    name: String,
    markets: dashmap::DashMap<String, FxResult<Ticker>>,
    requests: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockMarketDataProvider {
    /// Create a new mock provider with no markets.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markets: dashmap::DashMap::new(),
            requests: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Publish a ticker for a market symbol such as `btcngn`.
    pub fn set_ticker(&self, symbol: impl Into<String>, ticker: Ticker) {
        self.markets.insert(symbol.into(), Ok(ticker));
    }

    /// Publish a market whose ticker only carries a last price.
    pub fn set_price(&self, symbol: impl Into<String>, price: impl Into<String>) {
        self.set_ticker(symbol, Ticker::with_price(price));
    }

    /// Make lookups for a market symbol fail with the given error.
    pub fn set_failure(&self, symbol: impl Into<String>, error: crate::FxError) {
        self.markets.insert(symbol.into(), Err(error));
    }

    /// Market symbols requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_ticker(&self, market: &MarketPair) -> FxResult<TickerLookup> {
        let symbol = market.symbol();
        self.requests.lock().push(symbol.clone());

        match self.markets.get(&symbol) {
            Some(entry) => entry.value().clone().map(TickerLookup::Found),
            None => Ok(TickerLookup::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FxError;
    use cryptoconv_common::Currency;

    #[tokio::test]
    async fn test_mock_provider_found_and_not_found() {
        let provider = MockMarketDataProvider::new("test");
        provider.set_price("btcngn", "50000000");

        let btcngn = MarketPair::new(Currency::btc(), Currency::ngn());
        let found = provider.fetch_ticker(&btcngn).await.unwrap();
        assert_eq!(found.into_ticker().unwrap().price, "50000000");

        let missing = provider.fetch_ticker(&btcngn.inverse()).await.unwrap();
        assert_eq!(missing, TickerLookup::NotFound);

        assert_eq!(provider.requests(), vec!["btcngn", "ngnbtc"]);
        assert_eq!(provider.name(), "test");
    }

    #[tokio::test]
    async fn test_mock_provider_failure() {
        let provider = MockMarketDataProvider::new("test");
        let market = MarketPair::new(Currency::btc(), Currency::ngn());
        provider.set_failure(
            "btcngn",
            FxError::UpstreamStatus {
                market: market.clone(),
                status: 500,
            },
        );

        let result = provider.fetch_ticker(&market).await;

        assert!(matches!(
            result,
            Err(FxError::UpstreamStatus { status: 500, .. })
        ));
    }
}
