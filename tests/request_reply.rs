//! End-to-end request-reply over HTTP.

#![allow(clippy::panic)]

mod common;

use std::time::{Duration, Instant};

use common::{start_gateway, start_responder};

async fn get(url: &str) -> reqwest::Response {
    let Ok(response) = reqwest::get(url).await else {
        panic!("request to {url} failed");
    };
    response
}

#[tokio::test]
async fn ping_returns_responder_reply() {
    let (addr, bus) = start_gateway(Duration::from_secs(3)).await;
    start_responder(&bus, "ping", r#"{"error":"","data":{"ok":true}}"#).await;

    let response = get(&format!("http://{addr}/ping")).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let Ok(body) = response.text().await else {
        panic!("body read failed");
    };
    assert_eq!(body, r#"{"error":"","data":{"ok":true}}"#);
}

#[tokio::test]
async fn responder_error_is_returned_with_200() {
    let (addr, bus) = start_gateway(Duration::from_secs(3)).await;
    start_responder(&bus, "users", r#"{"error":"user not found","data":{}}"#).await;

    let response = get(&format!("http://{addr}/users/42?verbose=1")).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let Ok(body) = response.json::<serde_json::Value>().await else {
        panic!("body is not JSON");
    };
    assert_eq!(
        body,
        serde_json::json!({"error": "user not found", "data": {}})
    );
}

#[tokio::test]
async fn silent_responder_fails_within_deadline() {
    let deadline = Duration::from_millis(200);
    let (addr, _bus) = start_gateway(deadline).await;

    let started = Instant::now();
    let response = get(&format!("http://{addr}/silent")).await;
    let elapsed = started.elapsed();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(elapsed >= deadline);
    assert!(elapsed < deadline + Duration::from_secs(1));
    let Ok(body) = response.text().await else {
        panic!("body read failed");
    };
    assert!(body.contains("timed out"), "unexpected body: {body}");
}

#[tokio::test]
async fn root_path_never_reaches_bus() {
    let deadline = Duration::from_secs(3);
    let (addr, _bus) = start_gateway(deadline).await;

    let started = Instant::now();
    let response = get(&format!("http://{addr}/")).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(started.elapsed() < deadline);
    let Ok(body) = response.text().await else {
        panic!("body read failed");
    };
    assert_eq!(body, "missing topic in path\n");
}

#[tokio::test]
async fn bare_ws_path_never_reaches_bus() {
    let (addr, bus) = start_gateway(Duration::from_millis(200)).await;
    let mut observer = bus.subscribe("ws").await;

    let response = get(&format!("http://{addr}/ws")).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(observer.try_recv().is_err());
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let (addr, bus) = start_gateway(Duration::from_secs(3)).await;
    start_responder(&bus, "ping", r#"{"error":"","data":{"ok":true}}"#).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let url = format!("http://{addr}/ping/{i}");
        handles.push(tokio::spawn(async move { get(&url).await.status() }));
    }
    for handle in handles {
        let Ok(status) = handle.await else {
            panic!("request task panicked");
        };
        assert_eq!(status, reqwest::StatusCode::OK);
    }
}
