//! Frames sent to WebSocket clients.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bus::BusMessage;

/// Discriminator for server-to-client frames.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    /// A message published on the bound topic.
    Event,
    /// The binding could not be established.
    Error,
}

/// Envelope of every text frame the gateway writes.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Server-generated frame ID.
    pub id: String,
    /// Frame type discriminator.
    #[serde(rename = "type")]
    pub frame_type: FrameType,
    /// Topic the message was published on.
    pub topic: String,
    /// Reply topic supplied by the publisher, if any.
    pub reply_to: Option<String>,
    /// ISO-8601 timestamp of forwarding.
    pub timestamp: DateTime<Utc>,
    /// Decoded payload. Non-JSON payloads appear as a string.
    pub payload: serde_json::Value,
}

impl Frame {
    /// Renders a bus delivery as an event frame.
    #[must_use]
    pub fn event(message: &BusMessage) -> Self {
        let payload = serde_json::from_slice(&message.payload).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&message.payload).into_owned())
        });
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            frame_type: FrameType::Event,
            topic: message.topic.clone(),
            reply_to: message.reply_to.clone(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error frame for `topic`.
    #[must_use]
    pub fn error(topic: &str, message: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            frame_type: FrameType::Error,
            topic: topic.to_string(),
            reply_to: None,
            timestamp: Utc::now(),
            payload: serde_json::json!({ "message": message }),
        }
    }

    /// Serializes the frame to its JSON text.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
