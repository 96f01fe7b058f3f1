//! Cancellable topic subscription with a bounded delivery queue.
//!
//! Each [`Subscription`] owns a pump task that moves messages from the bus
//! client into a bounded [`mpsc`] queue. The holder of the `Subscription`
//! is the queue's only consumer, so whatever it writes to (a WebSocket
//! sink) has exactly one writer, and the bus client's dispatch never waits
//! on socket I/O.
//!
//! Cancellation closes the queue. The pump notices, unsubscribes from the
//! bus and exits; [`Subscription::cancel`] waits for that, so once it
//! returns nothing is in flight.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::BusMessage;
use crate::domain::Topic;

/// Where a pump reads deliveries from.
#[derive(Debug)]
pub(crate) enum SubscriptionSource {
    /// A NATS subscriber.
    Nats(async_nats::Subscriber),
    /// A subscriber channel on the in-process bus.
    Local(mpsc::Receiver<BusMessage>),
}

impl SubscriptionSource {
    async fn next(&mut self) -> Option<BusMessage> {
        use futures_util::StreamExt;

        match self {
            Self::Nats(subscriber) => subscriber.next().await.map(BusMessage::from),
            Self::Local(receiver) => receiver.recv().await,
        }
    }

    async fn unsubscribe(self) {
        match self {
            Self::Nats(mut subscriber) => {
                if let Err(err) = subscriber.unsubscribe().await {
                    tracing::warn!(error = %err, "failed to unsubscribe from bus");
                }
            }
            // Dropping the receiver removes it from the local bus.
            Self::Local(_) => {}
        }
    }
}

/// Live subscription to one topic.
///
/// Dropping a subscription without calling [`Subscription::cancel`] aborts
/// the pump, which also releases the bus subscription.
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    receiver: mpsc::Receiver<BusMessage>,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Starts the pump for `source` with a queue of `capacity` messages.
    pub(crate) fn spawn(topic: Topic, source: SubscriptionSource, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let pump = tokio::spawn(pump(topic.clone(), source, sender));
        Self {
            topic,
            receiver,
            pump: Some(pump),
        }
    }

    /// Waits for the next delivery, in bus order.
    ///
    /// Returns `None` after cancellation, or once the bus side of the
    /// subscription has ended and the queue is drained.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        if self.pump.is_none() {
            return None;
        }
        self.receiver.recv().await
    }

    /// Cancels the subscription and waits for the pump to stop.
    ///
    /// Idempotent: calls after the first return immediately. Messages still
    /// queued at cancellation are discarded.
    pub async fn cancel(&mut self) {
        let Some(pump) = self.pump.take() else {
            return;
        };
        self.receiver.close();
        if let Err(err) = pump.await {
            tracing::warn!(topic = %self.topic, error = %err, "subscription pump failed");
        }
        tracing::debug!(topic = %self.topic, "subscription cancelled");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

/// Moves deliveries from `source` into the queue until either side closes.
async fn pump(topic: Topic, mut source: SubscriptionSource, sender: mpsc::Sender<BusMessage>) {
    loop {
        let next = tokio::select! {
            () = sender.closed() => break,
            next = source.next() => next,
        };
        let Some(message) = next else {
            tracing::debug!(%topic, "bus closed the subscription");
            break;
        };
        // Waits while the queue is full; fails once the consumer cancels.
        if sender.send(message).await.is_err() {
            break;
        }
    }
    source.unsubscribe().await;
}
