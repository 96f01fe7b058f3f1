//! HTTP endpoint handlers.

pub mod request;

use axum::Router;
use axum::routing::any;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// WebSocket routes. `/ws` and `/ws/` are routed too so that a missing
/// topic is reported as such instead of being sent to the bus as topic `ws`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ws", any(ws_handler))
        .route("/ws/", any(ws_handler))
        .route("/ws/{*rest}", any(ws_handler))
}
