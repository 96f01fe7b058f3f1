//! Service layer: request-reply orchestration over the bus.

pub mod bridge_service;

pub use bridge_service::BridgeService;
