//! cryptoconv Gateway
//!
//! HTTP front end for the conversion engine. It binds the `from`, `to` and
//! `amount` query parameters, runs the conversion and maps engine errors to
//! HTTP responses.

pub mod config;
pub mod http;
pub mod metrics;

pub use config::{GatewayConfig, LogFormat};
pub use http::{create_router, GatewayState};
pub use metrics::{Metrics, SharedMetrics};
