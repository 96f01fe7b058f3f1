//! # bus-gateway
//!
//! HTTP and WebSocket gateway for a NATS message bus.
//!
//! Clients that only speak HTTP get request-reply: the first path segment
//! is the topic, the remaining segments and the query string travel in the
//! request message, and the responder's reply comes back as JSON. Clients
//! that speak WebSocket get publish-subscribe: `/ws/<topic>` streams every
//! message published on `<topic>`.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── Request handler (api/)      ├── WS handler (ws/)
//!     │                               │
//!     ├── BridgeService (service/)    ├── Binding + Subscription queue
//!     │                               │
//!     ├── PathRouter, Reply (domain/) ┘
//!     │
//!     └── BusConnection (bus/) ── NATS or in-process bus
//! ```

pub mod api;
pub mod app_state;
pub mod bus;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
