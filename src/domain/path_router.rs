//! Pure mapping from HTTP paths and query strings to bus addressing.
//!
//! Request-reply paths look like `/<topic>/<arg>/<arg>...`; every segment
//! after the topic becomes a positional argument, empty segments included.
//! Subscription paths look like `/ws/<topic>` and ignore anything after the
//! topic segment.

use std::collections::BTreeMap;

use super::Topic;
use crate::error::RoutingError;

/// Literal first segment of WebSocket subscription paths.
pub const SUBSCRIPTION_PREFIX: &str = "ws";

/// Multi-valued query parameters, ordered by key with values in the order
/// they appeared.
pub type QueryParams = BTreeMap<String, Vec<String>>;

/// Result of routing a request-reply path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRoute {
    /// Topic the request is sent to.
    pub topic: Topic,
    /// Positional arguments following the topic segment.
    pub args: Vec<String>,
}

/// Routes a request-reply path to its topic and positional arguments.
///
/// # Errors
///
/// Returns [`RoutingError::EmptyTopic`] when the first segment is empty
/// (e.g. `/` or `//x`), [`RoutingError::MalformedSegment`] when a segment
/// does not percent-decode to UTF-8 and [`RoutingError::MalformedTopic`]
/// when the topic is not a valid bus topic.
pub fn route_request(path: &str) -> Result<RequestRoute, RoutingError> {
    let mut segments = split_segments(path);
    let topic = match segments.next() {
        Some(raw) => Topic::parse(&decode_segment(raw)?)?,
        None => return Err(RoutingError::EmptyTopic),
    };
    let args = segments
        .map(|raw| decode_segment(raw).map(std::borrow::Cow::into_owned))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RequestRoute { topic, args })
}

/// Routes a `/ws/<topic>` path to its topic.
///
/// # Errors
///
/// Returns [`RoutingError::MissingPrefix`] when the first segment is not
/// `ws`, and the same topic errors as [`route_request`] for the second
/// segment.
pub fn route_subscription(path: &str) -> Result<Topic, RoutingError> {
    let mut segments = split_segments(path);
    if segments.next() != Some(SUBSCRIPTION_PREFIX) {
        return Err(RoutingError::MissingPrefix(SUBSCRIPTION_PREFIX));
    }
    let raw = segments.next().ok_or(RoutingError::EmptyTopic)?;
    Topic::parse(&decode_segment(raw)?)
}

/// Parses a raw query string (without the leading `?`) into a multi-map.
///
/// Keys and values are form-urlencoded decoded. Repeated keys accumulate
/// values in order of appearance.
#[must_use]
pub fn parse_query(raw: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    let Some(raw) = raw else {
        return params;
    };
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

/// Splits a path on `/`, dropping the empty segment produced by the
/// leading slash.
fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn decode_segment(raw: &str) -> Result<std::borrow::Cow<'_, str>, RoutingError> {
    urlencoding::decode(raw).map_err(|_| RoutingError::MalformedSegment(raw.to_string()))
}
