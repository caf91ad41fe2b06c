//! cryptoconv FX Engine
//!
//! Resolves exchange rates from an upstream market data API and converts
//! amounts between currencies.
//!
//! # Features
//!
//! - Pluggable market data providers behind [`MarketDataProvider`]
//! - Quidax REST client with a hard request timeout
//! - Direct/inverse market resolution with exact decimal arithmetic
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cryptoconv_fx::{ConversionEngine, QuidaxConfig, QuidaxProvider};
//! use cryptoconv_common::Currency;
//! use rust_decimal::Decimal;
//!
//! let provider = QuidaxProvider::new(QuidaxConfig::default())?;
//! let engine = ConversionEngine::new(Arc::new(provider));
//!
//! let conversion = engine
//!     .convert(Currency::btc(), Currency::ngn(), Decimal::TWO)
//!     .await?;
//! println!("{}", conversion.output);
//! ```

pub mod conversion;
pub mod engine;
pub mod error;
pub mod provider;
pub mod quidax;

pub use conversion::{ApplyError, Conversion, ConversionResult, RateDirection};
pub use engine::ConversionEngine;
pub use error::{FxError, FxResult};
pub use provider::{MarketDataProvider, TickerLookup};
pub use quidax::{QuidaxConfig, QuidaxProvider};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockMarketDataProvider;
