//! HTTP/JSON API server implementation.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use cryptoconv_common::Currency;
use cryptoconv_fx::{Conversion, ConversionEngine, FxError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::metrics::SharedMetrics;

/// Response header carrying the conversion ID.
pub const CONVERSION_ID_HEADER: &str = "x-conversion-id";

/// Shared state for the HTTP server.
#[derive(Clone)]
pub struct GatewayState {
    engine: Arc<ConversionEngine>,
    metrics: SharedMetrics,
}

impl GatewayState {
    /// Create a new gateway state.
    pub fn new(engine: ConversionEngine, metrics: SharedMetrics) -> Self {
        Self {
            engine: Arc::new(engine),
            metrics,
        }
    }

    /// Get the metrics handle.
    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }
}

/// Create the Axum router with all endpoints.
pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(export_metrics))
        .route("/api/v1/convert", get(convert))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Prometheus metrics endpoint.
async fn export_metrics(State(state): State<GatewayState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

/// Query parameters of the convert endpoint.
///
/// All fields are optional at the binding layer so a missing parameter is
/// reported through [`ApiError`] like every other failure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConvertParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<String>,
}

impl ConvertParams {
    fn into_parts(self) -> Result<(Currency, Currency, Decimal), ApiError> {
        let from = required(self.from, "from")?;
        let to = required(self.to, "to")?;
        let amount = required(self.amount, "amount")?;

        Ok((Currency::new(from), Currency::new(to), parse_amount(&amount)?))
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::InvalidRequest(format!("Missing required parameter: {name}")))
}

/// Parse a decimal amount, accepting plain (`12.5`) and scientific (`1.25e1`) forms.
///
/// Digit separators are rejected, as is any plain amount the decimal type
/// would have to round.
fn parse_amount(raw: &str) -> Result<Decimal, ApiError> {
    let trimmed = raw.trim();
    let invalid = || ApiError::InvalidRequest(format!("Invalid amount: {raw:?}"));

    if trimmed.contains('_') {
        return Err(invalid());
    }

    match Decimal::from_str(trimmed) {
        Ok(amount) if amount.scale() < significant_fraction_digits(trimmed) => Err(
            ApiError::InvalidRequest(format!("Amount exceeds supported precision: {raw:?}")),
        ),
        Ok(amount) => Ok(amount),
        Err(_) => Decimal::from_scientific(trimmed).map_err(|_| invalid()),
    }
}

/// Fractional digits of a plain decimal string, ignoring trailing zeros.
fn significant_fraction_digits(plain: &str) -> u32 {
    plain
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.trim_end_matches('0').len() as u32)
}

/// Convert endpoint.
async fn convert(
    State(state): State<GatewayState>,
    params: Result<Query<ConvertParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    state.metrics.conversion_requested();

    match run_conversion(&state, params).await {
        Ok(conversion) => {
            state.metrics.conversion_succeeded(conversion.direction);
            Ok((
                [(CONVERSION_ID_HEADER, conversion.id.to_string())],
                Json(conversion.result()),
            )
                .into_response())
        }
        Err(err) => {
            match &err {
                ApiError::InvalidRequest(_) | ApiError::Fx(FxError::AmountOutOfRange { .. }) => {
                    state.metrics.conversion_rejected()
                }
                ApiError::Fx(FxError::UnsupportedMarket(_)) => state.metrics.conversion_unsupported(),
                ApiError::Fx(_) => state.metrics.conversion_upstream_failed(),
            }
            Err(err)
        }
    }
}

async fn run_conversion(
    state: &GatewayState,
    params: Result<Query<ConvertParams>, QueryRejection>,
) -> Result<Conversion, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let (from, to, amount) = params.into_parts()?;

    info!(
        from = %from,
        to = %to,
        amount = %amount,
        provider = state.engine.provider_name(),
        "Converting"
    );

    Ok(state.engine.convert(from, to, amount).await?)
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine readable error code.
    pub code: String,
    /// Human readable message.
    pub message: String,
}

/// API error wrapper.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request parameters are missing or malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// Conversion failed.
    #[error(transparent)]
    Fx(#[from] FxError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Fx(FxError::AmountOutOfRange { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Fx(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Fx(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Fx(FxError::ProviderSetup(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Fx(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Error code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Fx(e) => e.error_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_client_error() {
            warn!(code = self.code(), error = %self, "Conversion rejected");
        } else {
            error!(code = self.code(), error = %self, "Conversion failed");
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use axum::body::Body;
    use axum::http::Request;
    use cryptoconv_common::MarketPair;
    use cryptoconv_fx::MockMarketDataProvider;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    fn make_state() -> (Arc<MockMarketDataProvider>, GatewayState) {
        let provider = Arc::new(MockMarketDataProvider::new("test"));
        provider.set_price("btcngn", "50000000");

        let engine = ConversionEngine::new(provider.clone());
        let state = GatewayState::new(engine, Arc::new(Metrics::new()));
        (provider, state)
    }

    async fn send_get(state: GatewayState, uri: &str) -> (StatusCode, Response) {
        let response = create_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        (response.status(), response)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_, state) = make_state();

        let (status, _) = send_get(state, "/health").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_direct_conversion() {
        let (_, state) = make_state();

        let (status, response) = send_get(state, "/api/v1/convert?from=btc&to=ngn&amount=2").await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.headers().contains_key(CONVERSION_ID_HEADER));

        let body = json_body(response).await;
        assert_eq!(body["sourceAmount"], "2");
        assert_eq!(body["sourceCurrency"], "BTC");
        assert_eq!(body["targetAmount"], "100000000");
        assert_eq!(body["targetCurrency"], "NGN");
        assert_eq!(body["rate"], "50000000");
    }

    #[tokio::test]
    async fn test_inverse_conversion() {
        let (provider, state) = make_state();

        let (status, response) =
            send_get(state, "/api/v1/convert?from=ngn&to=btc&amount=100000000").await;

        assert_eq!(status, StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["targetAmount"], "2.00000000");
        assert_eq!(body["sourceCurrency"], "NGN");
        assert_eq!(body["targetCurrency"], "BTC");
        // Raw btcngn price, not inverted.
        assert_eq!(body["rate"], "50000000");
        assert_eq!(provider.requests(), vec!["ngnbtc", "btcngn"]);
    }

    #[tokio::test]
    async fn test_unsupported_market_is_bad_request() {
        let (_, state) = make_state();
        let metrics = state.metrics().clone();

        let (status, response) = send_get(state, "/api/v1/convert?from=xyz&to=abc&amount=1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "UNSUPPORTED_MARKET");
        assert!(body["message"].as_str().unwrap().contains("xyzabc"));
        assert_eq!(metrics.snapshot().conversions_unsupported, 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (provider, state) = make_state();
        provider.set_failure(
            "ethngn",
            FxError::UpstreamDecode {
                market: MarketPair::new(Currency::new("eth"), Currency::ngn()),
                reason: "expected value at line 1 column 1".to_string(),
            },
        );
        let metrics = state.metrics().clone();

        let (status, response) = send_get(state, "/api/v1/convert?from=eth&to=ngn&amount=1").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["code"], "UPSTREAM_MALFORMED");
        assert_eq!(metrics.snapshot().conversions_upstream_failed, 1);
        assert_eq!(provider.requests(), vec!["ethngn"]);
    }

    #[tokio::test]
    async fn test_upstream_timeout_is_gateway_timeout() {
        let (provider, state) = make_state();
        provider.set_failure(
            "ethngn",
            FxError::UpstreamTimeout {
                market: MarketPair::new(Currency::new("eth"), Currency::ngn()),
            },
        );

        let (status, response) = send_get(state, "/api/v1/convert?from=eth&to=ngn&amount=1").await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json_body(response).await["code"], "UPSTREAM_TIMEOUT");
    }

    #[tokio::test]
    async fn test_oversized_amount_is_unprocessable() {
        let (provider, state) = make_state();
        let metrics = state.metrics().clone();

        let (status, response) = send_get(
            state,
            "/api/v1/convert?from=btc&to=ngn&amount=10000000000000000000000",
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["code"], "AMOUNT_OUT_OF_RANGE");
        assert!(body["message"].as_str().unwrap().contains("btcngn"));
        assert_eq!(metrics.snapshot().conversions_rejected, 1);
        assert_eq!(metrics.snapshot().conversions_upstream_failed, 0);
        assert_eq!(provider.requests(), vec!["btcngn"]);
    }

    #[tokio::test]
    async fn test_missing_parameter_is_bad_request() {
        let (provider, state) = make_state();
        let metrics = state.metrics().clone();

        let (status, response) = send_get(state, "/api/v1/convert?from=btc&amount=2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert_eq!(body["message"], "Missing required parameter: to");
        assert!(provider.requests().is_empty());
        assert_eq!(metrics.snapshot().conversions_rejected, 1);
    }

    #[tokio::test]
    async fn test_invalid_amount_is_bad_request() {
        let (provider, state) = make_state();

        let (status, response) = send_get(state, "/api/v1/convert?from=btc&to=ngn&amount=two").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_REQUEST");
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_scientific_amount() {
        let (_, state) = make_state();

        let (status, response) = send_get(state, "/api/v1/convert?from=btc&to=ngn&amount=1.5e-1").await;

        assert_eq!(status, StatusCode::OK);
        let body = json_body(response).await;
        let target = Decimal::from_str(body["targetAmount"].as_str().unwrap()).unwrap();
        assert_eq!(target, dec!(7500000));
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (_, state) = make_state();

        let (status, _) = send_get(state.clone(), "/api/v1/convert?from=btc&to=ngn&amount=2").await;
        assert_eq!(status, StatusCode::OK);

        let (status, response) = send_get(state, "/metrics").await;
        assert_eq!(status, StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("cryptoconv_conversions_succeeded_total 1"));
        assert!(text.contains(r#"cryptoconv_conversions_by_direction_total{direction="direct"} 1"#));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.50 ").unwrap().to_string(), "12.50");
        assert_eq!(parse_amount("1.25e1").unwrap(), Decimal::new(125, 1));
        assert!(parse_amount("").is_err());
        assert!(parse_amount("1,000").is_err());
        assert!(parse_amount("1_000").is_err());
        assert!(parse_amount("1_0e2").is_err());

        let finest = parse_amount("0.0000000000000000000000000001").unwrap();
        assert_eq!(finest.scale(), 28);
        assert!(parse_amount("0.00000000000000000000000000001").is_err());
        assert!(parse_amount("7922816251426433759354395033.56").is_err());
    }
}
