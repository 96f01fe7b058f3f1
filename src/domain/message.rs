//! Wire types exchanged with bus responders.
//!
//! [`RequestMessage`] is what the gateway sends for every HTTP request;
//! [`Reply`] is what a responder is expected to answer with. Both travel as
//! JSON.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::path_router::QueryParams;

/// Request published on a topic for one HTTP call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// HTTP method of the originating request (e.g. `"GET"`).
    pub method: String,
    /// Positional path arguments following the topic segment.
    pub args: Vec<String>,
    /// Multi-valued query string parameters.
    pub query: QueryParams,
}

/// Reply produced by a bus responder.
///
/// An empty `error` means success and `data` is authoritative. Missing
/// fields decode to their empty values, and a `null` `data` decodes to an
/// empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Error description; empty on success.
    #[serde(default)]
    pub error: String,
    /// Arbitrary JSON payload keyed by string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
}

impl Reply {
    /// Decodes a reply from a raw bus payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the payload is not a reply object.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Encodes the reply as the HTTP response body
    /// `{"error": ..., "data": ...}`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
