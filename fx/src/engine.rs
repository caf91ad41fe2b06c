//! Conversion engine: resolves a market and converts an amount.

use std::sync::Arc;

use cryptoconv_common::{Currency, MarketPair, Money, Ticker};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::conversion::{ApplyError, Conversion, RateDirection};
use crate::error::{FxError, FxResult};
use crate::provider::{MarketDataProvider, TickerLookup};

/// A market that resolved for a requested currency pair.
#[derive(Debug, Clone)]
pub struct ResolvedMarket {
    /// Market the ticker came from.
    pub market: MarketPair,
    /// Orientation relative to the requested pair.
    pub direction: RateDirection,
    /// Ticker snapshot.
    pub ticker: Ticker,
}

/// Converts amounts using live tickers from a market data provider.
pub struct ConversionEngine {
    provider: Arc<dyn MarketDataProvider>,
}

impl ConversionEngine {
    /// Create a new engine with the given provider.
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Name of the underlying market data provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Find the market for `from -> to`, trying the direct market first and
    /// the inverse market only if the direct one is not listed.
    ///
    /// Makes at most two sequential provider calls.
    #[instrument(skip_all, fields(from = %from, to = %to))]
    pub async fn resolve_market(&self, from: &Currency, to: &Currency) -> FxResult<ResolvedMarket> {
        let direct = MarketPair::new(from.clone(), to.clone());

        if let TickerLookup::Found(ticker) = self.provider.fetch_ticker(&direct).await? {
            return Ok(ResolvedMarket {
                market: direct,
                direction: RateDirection::Direct,
                ticker,
            });
        }

        let inverse = direct.inverse();
        debug!(market = %direct, inverse = %inverse, "Direct market not listed, trying inverse");

        match self.provider.fetch_ticker(&inverse).await? {
            TickerLookup::Found(ticker) => Ok(ResolvedMarket {
                market: inverse,
                direction: RateDirection::Inverse,
                ticker,
            }),
            TickerLookup::NotFound => Err(FxError::UnsupportedMarket(direct)),
        }
    }

    /// Convert an amount from one currency to another.
    #[instrument(skip_all, fields(from = %from, to = %to, amount = %amount))]
    pub async fn convert(&self, from: Currency, to: Currency, amount: Decimal) -> FxResult<Conversion> {
        let resolved = self.resolve_market(&from, &to).await?;

        let invalid_price = || FxError::InvalidPrice {
            market: resolved.market.clone(),
            price: resolved.ticker.price.clone(),
        };

        let rate = resolved.ticker.last_price().map_err(|_| invalid_price())?;
        let target = resolved
            .direction
            .apply(amount, rate)
            .map_err(|err| match err {
                ApplyError::ZeroPrice => invalid_price(),
                ApplyError::OutOfRange => FxError::AmountOutOfRange {
                    market: resolved.market.clone(),
                    amount,
                },
            })?;

        let conversion = Conversion::new(
            Money::new(amount, from),
            Money::new(target, to),
            rate,
            resolved.direction,
            resolved.market.clone(),
        );

        info!(
            conversion_id = %conversion.id,
            market = %conversion.market,
            direction = conversion.direction.as_str(),
            rate = %conversion.rate,
            target_amount = %conversion.output.value,
            "Conversion completed"
        );

        Ok(conversion)
    }
}
