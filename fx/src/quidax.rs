//! Quidax market data client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use cryptoconv_common::{MarketPair, Ticker};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{FxError, FxResult};
use crate::provider::{MarketDataProvider, TickerLookup};

/// Production Quidax API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.quidax.com/api/v1";

/// Configuration for the Quidax client.
#[derive(Debug, Clone)]
pub struct QuidaxConfig {
    /// API base URL, without the trailing `/markets` segment.
    pub base_url: String,
    /// Hard timeout for a single ticker request.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for QuidaxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("cryptoconv/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Market data provider backed by the Quidax REST API.
#[derive(Debug, Clone)]
pub struct QuidaxProvider {
    client: reqwest::Client,
    base_url: String,
}

impl QuidaxProvider {
    /// Create a new client from config.
    pub fn new(config: QuidaxConfig) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| FxError::ProviderSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn ticker_url(&self, market: &MarketPair) -> String {
        format!("{}/markets/{}/ticker", self.base_url, market.symbol())
    }

    fn request_error(market: &MarketPair, err: reqwest::Error) -> FxError {
        if err.is_timeout() {
            FxError::UpstreamTimeout {
                market: market.clone(),
            }
        } else {
            FxError::UpstreamTransport {
                market: market.clone(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for QuidaxProvider {
    fn name(&self) -> &str {
        "quidax"
    }

    #[instrument(skip_all, fields(market = %market))]
    async fn fetch_ticker(&self, market: &MarketPair) -> FxResult<TickerLookup> {
        let response = self
            .client
            .get(self.ticker_url(market))
            .send()
            .await
            .map_err(|e| Self::request_error(market, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Market not listed");
            return Ok(TickerLookup::NotFound);
        }

        if !status.is_success() {
            warn!(status = status.as_u16(), "Unexpected market data status");
            return Err(FxError::UpstreamStatus {
                market: market.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::request_error(market, e))?;

        let envelope: TickerEnvelope =
            serde_json::from_slice(&body).map_err(|e| FxError::UpstreamDecode {
                market: market.clone(),
                reason: e.to_string(),
            })?;

        Ok(envelope.into_lookup())
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct TickerEnvelope {
    status: Option<String>,
    message: Option<String>,
    data: Option<MarketSnapshot>,
}

#[derive(Debug, Deserialize)]
struct MarketSnapshot {
    at: Option<i64>,
    market: Option<String>,
    ticker: Option<Ticker>,
}

impl TickerEnvelope {
    /// Only a `success` envelope carrying a ticker counts as a listed market.
    fn into_lookup(self) -> TickerLookup {
        let success = self.status.as_deref() == Some("success");

        match self.data {
            Some(MarketSnapshot {
                at,
                market,
                ticker: Some(ticker),
            }) if success => {
                debug!(
                    upstream_market = market.as_deref().unwrap_or_default(),
                    quoted_at = ?at.and_then(|secs| DateTime::from_timestamp(secs, 0)),
                    last = %ticker.price,
                    "Ticker received"
                );
                TickerLookup::Found(ticker)
            }
            _ => {
                debug!(
                    status = self.status.as_deref().unwrap_or_default(),
                    message = self.message.as_deref().unwrap_or_default(),
                    "Market data response carried no ticker"
                );
                TickerLookup::NotFound
            }
        }
    }
}
