//! WebSocket binding loop.
//!
//! Owns both halves of one socket and the binding's
//! [`Subscription`](crate::bus::Subscription). This task is the only
//! writer to the socket: deliveries come out of the subscription queue and
//! go straight to the sink, in bus order.

use std::fmt::Display;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::Instrument;

use super::binding::{Binding, BindingState, CloseReason};
use super::messages::Frame;
use crate::bus::{BusConnection, BusMessage};
use crate::domain::Topic;

/// Runs one binding from subscribe to teardown.
///
/// - Subscribes to `topic`; on failure sends an error frame and closes.
/// - Forwards each delivery as one text frame.
/// - Stops on client close, read error, write error or end of the
///   subscription, then cancels the subscription exactly once.
pub async fn run_connection(
    socket: WebSocket,
    topic: Topic,
    bus: BusConnection,
    queue_capacity: usize,
) {
    let binding = Binding::new(topic);
    let span = tracing::info_span!("ws_binding", id = %binding.id(), topic = %binding.topic());
    let (ws_tx, ws_rx) = socket.split();
    drive(ws_tx, ws_rx, binding, bus, queue_capacity)
        .instrument(span)
        .await;
}

/// Drives a binding over any message sink and stream, returning it once
/// it has reached [`BindingState::Closed`].
async fn drive<Tx, Rx, E>(
    mut ws_tx: Tx,
    mut ws_rx: Rx,
    mut binding: Binding,
    bus: BusConnection,
    queue_capacity: usize,
) -> Binding
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut subscription = match bus.subscribe(binding.topic(), queue_capacity).await {
        Ok(subscription) => subscription,
        Err(err) => {
            tracing::warn!(error = %err, "subscribe failed, closing websocket");
            if let Ok(text) = Frame::error(binding.topic().as_str(), &err.to_string()).to_text() {
                if let Err(err) = ws_tx.send(Message::text(text)).await {
                    tracing::debug!(error = %err, "failed to send error frame");
                }
            }
            send_close(&mut ws_tx, close_code::ERROR, "subscription failed").await;
            binding.advance(BindingState::Closed);
            return binding;
        }
    };
    binding.advance(BindingState::Subscribed);
    tracing::info!("websocket subscribed");

    // Polled without `biased;` so client frames and deliveries share turns.
    let reason = loop {
        tokio::select! {
            delivery = subscription.recv() => {
                let Some(message) = delivery else {
                    break CloseReason::SubscriptionEnded;
                };
                if forward(&mut ws_tx, &message).await.is_err() {
                    break CloseReason::WriteFailed;
                }
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break CloseReason::ClientClosed,
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "websocket read failed");
                        break CloseReason::ReadFailed;
                    }
                    // Client frames carry no meaning for a subscription.
                    Some(Ok(_)) => {}
                }
            }
        }
    };

    binding.advance(BindingState::Closing);
    tracing::info!(%reason, "websocket binding closing");
    subscription.cancel().await;
    binding.advance(BindingState::Closed);

    match reason {
        CloseReason::SubscriptionEnded => {
            send_close(&mut ws_tx, close_code::AWAY, "subscription ended").await;
        }
        CloseReason::ClientClosed => {
            // Flushes the close reply queued by the protocol layer.
            if let Err(err) = ws_tx.close().await {
                tracing::debug!(error = %err, "failed to flush websocket close");
            }
        }
        CloseReason::ReadFailed | CloseReason::WriteFailed => {}
    }
    tracing::debug!("websocket binding closed");
    binding
}

/// Writes one delivery as a text frame.
async fn forward<Tx>(ws_tx: &mut Tx, message: &BusMessage) -> Result<(), ()>
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
{
    tracing::debug!(topic = %message.topic, bytes = message.payload.len(), "ws update");
    let text = Frame::event(message).to_text().map_err(|err| {
        tracing::warn!(error = %err, "failed to render frame");
    })?;
    ws_tx.send(Message::text(text)).await.map_err(|err| {
        tracing::warn!(error = %err, "websocket write failed");
    })
}

async fn send_close<Tx>(ws_tx: &mut Tx, code: u16, reason: &'static str)
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
{
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    if let Err(err) = ws_tx.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %err, code, "failed to send close frame");
    }
}
