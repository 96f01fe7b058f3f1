//! WebSocket layer: upgrade handling and subscription bindings.
//!
//! A connection to `/ws/<topic>` is bound to one bus subscription on
//! `<topic>` for its whole lifetime. Every message published on the topic
//! is forwarded as one text frame.

pub mod binding;
pub mod connection;
pub mod handler;
pub mod messages;
