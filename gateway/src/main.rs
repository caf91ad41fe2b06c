//! cryptoconv Gateway Binary
//!
//! Serves the currency conversion API backed by live exchange tickers.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cryptoconv_fx::{ConversionEngine, QuidaxProvider};
use cryptoconv_gateway::{create_router, GatewayConfig, GatewayState, LogFormat, Metrics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    info!("Starting cryptoconv gateway");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let provider = QuidaxProvider::new(config.market_data.clone())?;
    let engine = ConversionEngine::new(Arc::new(provider));
    let state = GatewayState::new(engine, Arc::new(Metrics::new()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;

    info!(
        listen_addr = %config.listen_addr,
        listen_port = %config.listen_port,
        market_data_url = %config.market_data.base_url,
        market_data_timeout_ms = config.market_data.timeout.as_millis() as u64,
        "Gateway running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
