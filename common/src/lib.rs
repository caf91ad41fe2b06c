//! cryptoconv Common Types
//!
//! This crate contains the data shapes shared by the market data fetcher,
//! the conversion calculator and the HTTP gateway: currency codes, monetary
//! amounts, market pairs and upstream ticker snapshots.

pub mod identifiers;
pub mod market;
pub mod monetary;

pub use identifiers::*;
pub use market::*;
pub use monetary::*;
