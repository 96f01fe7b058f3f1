//! bus-gateway server entry point.
//!
//! Connects to the bus and starts the Axum HTTP server with the
//! request-reply and WebSocket endpoints.

use tracing_subscriber::EnvFilter;

use bus_gateway::api;
use bus_gateway::app_state::AppState;
use bus_gateway::bus::BusConnection;
use bus_gateway::config::{GatewayConfig, LogFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    // Connect the bus
    tracing::info!(url = %config.nats_url, "connecting to message bus");
    let bus = BusConnection::connect(&config.nats_url, config.local_bus_capacity).await?;
    tracing::info!(url = %config.nats_url, "message bus connected");

    // Build application state
    let app_state = AppState::new(bus, config.request_timeout, config.ws_queue_capacity);

    // Build router
    let app = api::app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
