//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::bus::BusConnection;
use crate::service::BridgeService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor. Immutable once built.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Request-reply bridge.
    pub bridge_service: Arc<BridgeService>,
    /// Bus handle used to open WebSocket subscriptions.
    pub bus: BusConnection,
    /// Queue capacity of each WebSocket binding.
    pub ws_queue_capacity: usize,
}

impl AppState {
    /// Builds the state around a connected bus.
    #[must_use]
    pub fn new(
        bus: BusConnection,
        request_timeout: std::time::Duration,
        ws_queue_capacity: usize,
    ) -> Self {
        Self {
            bridge_service: Arc::new(BridgeService::new(bus.clone(), request_timeout)),
            bus,
            ws_queue_capacity,
        }
    }
}
