//! Catch-all request-reply handler.

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::IntoResponse;

use crate::app_state::AppState;
use crate::error::GatewayError;

/// `ANY /{topic}/{args...}` — Forward the call to the bus and return the
/// responder's reply.
///
/// Responds `200` with `{"error": ..., "data": ...}` as returned by the
/// responder.
///
/// # Errors
///
/// Returns [`GatewayError`] on routing failures, bus timeouts and transport
/// errors; all are rendered as `400` with a plain-text body.
pub async fn bridge_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<impl IntoResponse, GatewayError> {
    let reply = state
        .bridge_service
        .request(method.as_str(), uri.path(), uri.query())
        .await?;
    let body = reply
        .encode()
        .map_err(|err| GatewayError::Internal(err.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    ))
}
