//! In-process message bus.
//!
//! [`LocalBus`] keeps a registry of topic → subscriber channels. Every
//! subscriber gets its own bounded [`mpsc`] channel, so a slow subscriber
//! only slows down publishers on its own topic and never loses messages to
//! traffic elsewhere on the bus. Request-reply uses a throwaway
//! `_INBOX.<uuid>` reply topic the same way a NATS client does, so a
//! responder is simply a subscriber that publishes to `reply_to`.
//!
//! Selected with the `memory://` bus URL. Useful for development and for
//! exercising the gateway without a broker.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{RwLock, mpsc};

use super::BusMessage;
use crate::error::BusError;

/// Prefix of generated reply topics.
const INBOX_PREFIX: &str = "_INBOX";

type Subscribers = HashMap<String, Vec<mpsc::Sender<BusMessage>>>;

/// Topic-keyed bus shared by every publisher and subscriber in the
/// process.
///
/// Each subscriber buffers up to `capacity` messages. When a buffer is
/// full, [`LocalBus::publish`] waits for room instead of dropping.
#[derive(Debug, Clone)]
pub struct LocalBus {
    subscribers: Arc<RwLock<Subscribers>>,
    capacity: usize,
}

impl LocalBus {
    /// Creates a new `LocalBus` whose subscribers buffer `capacity`
    /// messages each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Publishes a message to every subscriber of its topic, in
    /// subscription order.
    ///
    /// Waits while a subscriber's buffer is full. Returns the number of
    /// subscribers that received the message; without subscribers the
    /// message is dropped and `0` is returned.
    pub async fn publish(&self, message: BusMessage) -> usize {
        // Clone the senders so no lock is held while waiting for room.
        let senders = {
            let subscribers = self.subscribers.read().await;
            subscribers.get(&message.topic).cloned().unwrap_or_default()
        };
        let mut delivered = 0;
        for sender in senders {
            if sender.send(message.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Subscribes to `topic`. The subscription ends when the returned
    /// receiver is dropped.
    pub async fn subscribe(&self, topic: &str) -> mpsc::Receiver<BusMessage> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|_, senders| {
            senders.retain(|sender| !sender.is_closed());
            !senders.is_empty()
        });
        subscribers
            .entry(topic.to_string())
            .or_default()
            .push(sender);
        receiver
    }

    /// Returns the current number of live subscribers across all topics.
    pub async fn receiver_count(&self) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers
            .values()
            .flatten()
            .filter(|sender| !sender.is_closed())
            .count()
    }

    /// Publishes `payload` on `topic` and waits for the first message on a
    /// fresh reply topic.
    ///
    /// The wait is unbounded here; callers apply the deadline.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Transport`] if the bus shuts down while waiting.
    pub async fn request(&self, topic: &str, payload: Bytes) -> Result<Bytes, BusError> {
        let inbox = format!("{INBOX_PREFIX}.{}", uuid::Uuid::new_v4().simple());
        // Subscribe before publishing so a fast responder cannot be missed.
        let mut replies = self.subscribe(&inbox).await;
        self.publish(BusMessage {
            topic: topic.to_string(),
            reply_to: Some(inbox),
            payload,
        })
        .await;

        replies
            .recv()
            .await
            .map(|message| message.payload)
            .ok_or_else(|| BusError::Transport("local bus closed".to_string()))
    }
}
