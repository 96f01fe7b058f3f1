//! Validated bus topic.
//!
//! [`Topic`] is a newtype around the subject string a request is sent to or
//! a WebSocket binding subscribes to. Construction goes through
//! [`Topic::parse`], so a `Topic` value is never empty and never contains
//! characters or wildcard tokens the bus would route ambiguously.

use std::fmt;

use serde::Serialize;

use crate::error::RoutingError;

/// Single-token wildcard of the bus subject grammar.
const WILDCARD_TOKEN: &str = "*";

/// Tail wildcard of the bus subject grammar.
const TAIL_WILDCARD_TOKEN: &str = ">";

/// Name of one bus channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Validates `raw` as a concrete (non-wildcard) topic.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::EmptyTopic`] for an empty string and
    /// [`RoutingError::MalformedTopic`] when the string contains whitespace,
    /// control characters, empty dot-separated tokens or wildcard tokens.
    pub fn parse(raw: &str) -> Result<Self, RoutingError> {
        if raw.is_empty() {
            return Err(RoutingError::EmptyTopic);
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(RoutingError::MalformedTopic(raw.to_string()));
        }
        let bad_token = raw
            .split('.')
            .any(|token| token.is_empty() || token == WILDCARD_TOKEN || token == TAIL_WILDCARD_TOKEN);
        if bad_token {
            return Err(RoutingError::MalformedTopic(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the topic as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
