//! HTTP layer: router composition.
//!
//! `/ws/<topic>` upgrades to a subscription; every other path is a
//! request-reply call whose first segment names the topic.

pub mod handlers;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the routes without state or middleware.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .fallback(handlers::request::bridge_request)
}

/// Builds the complete application: routes, tracing and CORS layers,
/// and state.
pub fn app(state: AppState) -> Router {
    build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use bytes::Bytes;
    use tower::ServiceExt;

    use super::*;
    use crate::bus::{BusConnection, BusMessage, LocalBus};

    fn state(bus: &LocalBus, timeout: Duration) -> AppState {
        AppState::new(BusConnection::Local(bus.clone()), timeout, 16)
    }

    async fn spawn_ping_responder(bus: &LocalBus) {
        let mut requests = bus.subscribe("ping").await;
        let bus = bus.clone();
        tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                if let Some(reply_to) = request.reply_to {
                    bus.publish(BusMessage {
                        topic: reply_to,
                        reply_to: None,
                        payload: Bytes::from_static(br#"{"error":"","data":{"ok":true}}"#),
                    })
                    .await;
                }
            }
        });
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Option<String>, Bytes) {
        let Ok(request) = Request::builder().method(method).uri(uri).body(Body::empty()) else {
            panic!("invalid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router failed");
        };
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let Ok(body) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        (status, content_type, body)
    }

    #[tokio::test]
    async fn ping_round_trip() {
        let bus = LocalBus::new(64);
        spawn_ping_responder(&bus).await;
        let app = app(state(&bus, Duration::from_secs(1)));

        let (status, content_type, body) = call(app, "GET", "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, Bytes::from_static(br#"{"error":"","data":{"ok":true}}"#));
    }

    #[tokio::test]
    async fn any_method_is_bridged() {
        let bus = LocalBus::new(64);
        spawn_ping_responder(&bus).await;
        let app = app(state(&bus, Duration::from_secs(1)));

        let (status, _, _) = call(app, "DELETE", "/ping/7").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn root_is_bad_request() {
        let bus = LocalBus::new(64);
        let app = app(state(&bus, Duration::from_secs(1)));

        let (status, content_type, body) = call(app, "GET", "/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert_eq!(body, Bytes::from_static(b"missing topic in path\n"));
    }

    #[tokio::test]
    async fn timeout_is_plain_text_bad_request() {
        let bus = LocalBus::new(64);
        let app = app(state(&bus, Duration::from_millis(50)));

        let (status, _, body) = call(app, "GET", "/nobody").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("timed out"), "unexpected body: {text}");
    }

    #[tokio::test]
    async fn ws_without_topic_is_bad_request() {
        let bus = LocalBus::new(64);
        let app = app(state(&bus, Duration::from_secs(1)));

        let (status, _, _) = call(app, "GET", "/ws/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bare_ws_path_never_reaches_bus() {
        let bus = LocalBus::new(64);
        let mut observer = bus.subscribe("ws").await;
        let app = app(state(&bus, Duration::from_millis(100)));

        let (status, _, body) = call(app, "GET", "/ws").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains("timed out"), "unexpected body: {text}");
        assert!(matches!(
            observer.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn plain_get_on_ws_path_is_bad_request_without_subscribing() {
        let bus = LocalBus::new(64);
        let app = app(state(&bus, Duration::from_secs(1)));

        let (status, _, body) = call(app, "GET", "/ws/alerts").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&body).starts_with("websocket upgrade failed"));
        assert_eq!(bus.receiver_count().await, 0);
    }
}
