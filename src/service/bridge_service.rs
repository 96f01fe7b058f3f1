//! Request-reply bridge: one HTTP call becomes one bus round trip.

use std::time::Duration;

use bytes::Bytes;

use crate::bus::BusConnection;
use crate::domain::{Reply, RequestMessage, path_router};
use crate::error::GatewayError;

/// Orchestrates request-reply calls over the bus.
///
/// Stateless apart from the shared bus handle: every call routes the path,
/// builds a [`RequestMessage`], performs a single bounded request and
/// decodes the [`Reply`]. Nothing is retried.
#[derive(Debug, Clone)]
pub struct BridgeService {
    bus: BusConnection,
    request_timeout: Duration,
}

impl BridgeService {
    /// Creates a new `BridgeService`.
    #[must_use]
    pub fn new(bus: BusConnection, request_timeout: Duration) -> Self {
        Self {
            bus,
            request_timeout,
        }
    }

    /// Routes `path`, sends the request on its topic and returns the
    /// responder's reply.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Routing`] before touching the bus when the
    /// path has no valid topic, [`GatewayError::UpstreamTimeout`] or
    /// [`GatewayError::Transport`] when the round trip fails, and
    /// [`GatewayError::InvalidReply`] when the responder answers with
    /// something that is not a reply object.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        raw_query: Option<&str>,
    ) -> Result<Reply, GatewayError> {
        let route = path_router::route_request(path)?;
        let message = RequestMessage {
            method: method.to_string(),
            args: route.args,
            query: path_router::parse_query(raw_query),
        };
        let payload = serde_json::to_vec(&message)
            .map_err(|err| GatewayError::Internal(err.to_string()))?;

        tracing::info!(
            topic = %route.topic,
            method = %message.method,
            args = ?message.args,
            query = ?message.query,
            "sending bus request"
        );

        let raw_reply = self
            .bus
            .request(&route.topic, Bytes::from(payload), self.request_timeout)
            .await
            .inspect_err(|err| {
                tracing::warn!(topic = %route.topic, error = %err, "bus request failed");
            })?;

        let reply = Reply::decode(&raw_reply).map_err(|err| {
            tracing::warn!(topic = %route.topic, error = %err, "undecodable bus reply");
            GatewayError::InvalidReply {
                topic: route.topic.to_string(),
                reason: err.to_string(),
            }
        })?;

        tracing::info!(
            topic = %route.topic,
            error = %reply.error,
            data = ?reply.data,
            "received bus reply"
        );
        Ok(reply)
    }
}
