//! FX engine error types.

use cryptoconv_common::MarketPair;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while resolving a rate or converting an amount.
///
/// A market that simply does not exist is not an error: providers report it
/// as [`crate::TickerLookup::NotFound`] so the engine can try the inverse pair.
#[derive(Debug, Clone, Error)]
pub enum FxError {
    /// Neither the requested market nor its inverse exists.
    #[error("Conversion market not supported: {0}")]
    UnsupportedMarket(MarketPair),

    /// Market data API answered with an unexpected HTTP status.
    #[error("Market data API returned status {status} for {market}")]
    UpstreamStatus { market: MarketPair, status: u16 },

    /// Market data API did not answer within the configured timeout.
    #[error("Market data API timed out for {market}")]
    UpstreamTimeout { market: MarketPair },

    /// Request to the market data API could not be completed.
    #[error("Market data request failed for {market}: {reason}")]
    UpstreamTransport { market: MarketPair, reason: String },

    /// Market data API response body could not be decoded.
    #[error("Malformed market data response for {market}: {reason}")]
    UpstreamDecode { market: MarketPair, reason: String },

    /// Ticker price cannot be used as a conversion rate.
    #[error("Invalid ticker price {price:?} for {market}")]
    InvalidPrice { market: MarketPair, price: String },

    /// The exact converted amount does not fit the decimal range.
    #[error("Amount {amount} cannot be converted exactly on {market}")]
    AmountOutOfRange { market: MarketPair, amount: Decimal },

    /// Provider could not be constructed.
    #[error("Market data provider setup failed: {0}")]
    ProviderSetup(String),
}

impl FxError {
    /// Whether the error was caused by the caller's request rather than
    /// by the upstream API or this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FxError::UnsupportedMarket(_) | FxError::AmountOutOfRange { .. }
        )
    }

    /// Whether the upstream API timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FxError::UpstreamTimeout { .. })
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::UnsupportedMarket(_) => "UNSUPPORTED_MARKET",
            FxError::UpstreamStatus { .. } => "UPSTREAM_STATUS",
            FxError::UpstreamTimeout { .. } => "UPSTREAM_TIMEOUT",
            FxError::UpstreamTransport { .. } => "UPSTREAM_UNAVAILABLE",
            FxError::UpstreamDecode { .. } => "UPSTREAM_MALFORMED",
            FxError::InvalidPrice { .. } => "UPSTREAM_INVALID_PRICE",
            FxError::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            FxError::ProviderSetup(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
