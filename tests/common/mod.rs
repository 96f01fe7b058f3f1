//! Shared utilities for gateway integration tests.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use bus_gateway::api;
use bus_gateway::app_state::AppState;
use bus_gateway::bus::{BusConnection, BusMessage, LocalBus};
use bytes::Bytes;
use tokio::net::TcpListener;

/// Starts the gateway on an ephemeral port backed by a fresh local bus.
pub async fn start_gateway(request_timeout: Duration) -> (SocketAddr, LocalBus) {
    let bus = LocalBus::new(1_024);
    let state = AppState::new(BusConnection::Local(bus.clone()), request_timeout, 16);

    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, api::app(state)).await;
    });
    (addr, bus)
}

/// Answers every request on `topic` with the fixed JSON `reply`.
pub async fn start_responder(bus: &LocalBus, topic: &str, reply: &'static str) {
    let mut requests = bus.subscribe(topic).await;
    let bus = bus.clone();
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            if let Some(reply_to) = request.reply_to {
                bus.publish(BusMessage {
                    topic: reply_to,
                    reply_to: None,
                    payload: Bytes::from_static(reply.as_bytes()),
                })
                .await;
            }
        }
    });
}

/// Publishes a JSON payload on `topic`, returning how many subscribers
/// received it.
pub async fn publish(bus: &LocalBus, topic: &str, payload: &str) -> usize {
    bus.publish(BusMessage {
        topic: topic.to_string(),
        reply_to: None,
        payload: Bytes::from(payload.to_string()),
    })
    .await
}

/// Waits until the bus has exactly `count` receivers, failing after
/// `within`.
pub async fn wait_for_receivers(bus: &LocalBus, count: usize, within: Duration) {
    let waited = tokio::time::timeout(within, async {
        while bus.receiver_count().await != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    if waited.is_err() {
        panic!(
            "expected {count} bus receivers, found {}",
            bus.receiver_count().await
        );
    }
}
