//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to an HTTP status code. Failures are returned to clients as a
//! plain-text body carrying the error description; only successful replies
//! are JSON.

use std::time::Duration;

use axum::http::StatusCode;
use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Failure to derive a bus topic (or arguments) from a request path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// The path does not name a topic.
    #[error("missing topic in path")]
    EmptyTopic,

    /// The topic contains characters the bus cannot route.
    #[error("malformed topic: {0:?}")]
    MalformedTopic(String),

    /// A path segment is not valid percent-encoded UTF-8.
    #[error("malformed path segment: {0:?}")]
    MalformedSegment(String),

    /// The path does not start with the expected routing prefix.
    #[error("path must start with /{0}/")]
    MissingPrefix(&'static str),
}

/// Failure reported by the message bus client.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Could not establish the bus connection.
    #[error("bus connection to {url} failed: {reason}")]
    Connect {
        /// Endpoint that was dialled.
        url: String,
        /// Underlying failure description.
        reason: String,
    },

    /// No reply arrived before the deadline.
    #[error("request to topic {topic:?} timed out after {} ms", .timeout.as_millis())]
    Timeout {
        /// Topic the request was sent on.
        topic: String,
        /// Deadline that expired.
        timeout: Duration,
    },

    /// Nobody is listening on the request topic.
    #[error("no responders on topic {0:?}")]
    NoResponders(String),

    /// Any other transport-level failure.
    #[error("bus transport error: {0}")]
    Transport(String),
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Variant           | HTTP Status               |
/// |-------------------|---------------------------|
/// | `Routing`         | 400 Bad Request           |
/// | `UpstreamTimeout` | 400 Bad Request           |
/// | `Transport`       | 400 Bad Request           |
/// | `InvalidReply`    | 400 Bad Request           |
/// | `Upgrade`         | 400 Bad Request           |
/// | `Internal`        | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request path could not be mapped to a topic.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The bus responder did not answer within the deadline.
    #[error("{0}")]
    UpstreamTimeout(String),

    /// The bus was unreachable or rejected the request.
    #[error("{0}")]
    Transport(String),

    /// The responder answered with something that is not a reply object.
    #[error("invalid reply from topic {topic:?}: {reason}")]
    InvalidReply {
        /// Topic the reply came from.
        topic: String,
        /// Decoding failure description.
        reason: String,
    },

    /// The WebSocket handshake could not be completed.
    #[error("websocket upgrade failed: {0}")]
    Upgrade(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<BusError> for GatewayError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Timeout { .. } => Self::UpstreamTimeout(err.to_string()),
            BusError::Connect { .. } | BusError::NoResponders(_) | BusError::Transport(_) => {
                Self::Transport(err.to_string())
            }
        }
    }
}

impl GatewayError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Routing(_)
            | Self::UpstreamTimeout(_)
            | Self::Transport(_)
            | Self::InvalidReply { .. }
            | Self::Upgrade(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{self}\n"),
        )
            .into_response()
    }
}
