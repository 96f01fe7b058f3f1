//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::Uri;
use axum::response::Response;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::path_router;
use crate::error::GatewayError;

/// `ANY /ws/{topic}` — Upgrade to WebSocket and stream the topic.
///
/// The topic is validated before the handshake is accepted; nothing is
/// subscribed unless both succeed.
///
/// # Errors
///
/// Returns [`GatewayError::Routing`] for a missing or malformed topic and
/// [`GatewayError::Upgrade`] when the request is not a valid WebSocket
/// handshake. Both map to 400.
pub async fn ws_handler(
    State(state): State<AppState>,
    uri: Uri,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, GatewayError> {
    let topic = path_router::route_subscription(uri.path()).inspect_err(|err| {
        tracing::warn!(path = uri.path(), error = %err, "rejected websocket path");
    })?;

    let upgrade = upgrade.map_err(|rejection| {
        tracing::warn!(%topic, error = %rejection, "websocket handshake failed");
        GatewayError::Upgrade(rejection.body_text())
    })?;

    tracing::info!(%topic, "establishing websocket connection");
    let bus = state.bus.clone();
    let capacity = state.ws_queue_capacity;
    let failed_topic = topic.clone();

    Ok(upgrade
        .on_failed_upgrade(move |err| {
            tracing::warn!(topic = %failed_topic, error = %err, "websocket upgrade failed");
        })
        .on_upgrade(move |socket| run_connection(socket, topic, bus, capacity)))
}
