//! Message bus access: connection handle, subscriptions, local bus.
//!
//! [`BusConnection`] is the one handle shared by every request and every
//! WebSocket binding. It is cheap to clone and safe to use concurrently
//! without extra locking; both backends guarantee that.

pub mod local;
pub mod subscription;

use std::time::Duration;

use bytes::Bytes;

pub use local::LocalBus;
pub use subscription::Subscription;

use crate::domain::Topic;
use crate::error::BusError;
use subscription::SubscriptionSource;

/// Bus URL that selects the in-process [`LocalBus`].
pub const LOCAL_BUS_URL: &str = "memory://";

/// A message delivered by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Topic the publisher expects a reply on, if any.
    pub reply_to: Option<String>,
    /// Raw payload bytes.
    pub payload: Bytes,
}

impl From<async_nats::Message> for BusMessage {
    fn from(message: async_nats::Message) -> Self {
        Self {
            topic: message.subject.to_string(),
            reply_to: message.reply.map(|reply| reply.to_string()),
            payload: message.payload,
        }
    }
}

/// Shared handle to the message bus.
#[derive(Debug, Clone)]
pub enum BusConnection {
    /// A NATS server connection.
    Nats(async_nats::Client),
    /// The in-process bus.
    Local(LocalBus),
}

impl BusConnection {
    /// Connects to the bus at `url`.
    ///
    /// [`LOCAL_BUS_URL`] creates a [`LocalBus`] buffering `local_capacity`
    /// messages per subscriber; anything else is treated as a NATS server address.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Connect`] when the NATS server cannot be reached.
    pub async fn connect(url: &str, local_capacity: usize) -> Result<Self, BusError> {
        if url == LOCAL_BUS_URL {
            return Ok(Self::Local(LocalBus::new(local_capacity)));
        }
        let client = async_nats::connect(url)
            .await
            .map_err(|err| BusError::Connect {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self::Nats(client))
    }

    /// Sends one request on `topic` and waits at most `timeout` for the
    /// reply payload. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Timeout`] when the deadline passes,
    /// [`BusError::NoResponders`] when the server knows nobody listens on
    /// `topic`, and [`BusError::Transport`] for other failures.
    pub async fn request(
        &self,
        topic: &Topic,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, BusError> {
        let call = async {
            match self {
                Self::Nats(client) => client
                    .request(topic.to_string(), payload)
                    .await
                    .map(|message| message.payload)
                    .map_err(|err| nats_request_error(topic, timeout, &err)),
                Self::Local(bus) => bus.request(topic.as_str(), payload).await,
            }
        };
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| BusError::Timeout {
                topic: topic.to_string(),
                timeout,
            })?
    }

    /// Subscribes to `topic`, buffering up to `queue_capacity` undelivered
    /// messages.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Transport`] if the NATS server rejects the
    /// subscription.
    pub async fn subscribe(
        &self,
        topic: &Topic,
        queue_capacity: usize,
    ) -> Result<Subscription, BusError> {
        let source = match self {
            Self::Nats(client) => {
                let subscriber = client
                    .subscribe(topic.to_string())
                    .await
                    .map_err(|err| BusError::Transport(err.to_string()))?;
                SubscriptionSource::Nats(subscriber)
            }
            Self::Local(bus) => SubscriptionSource::Local(bus.subscribe(topic.as_str()).await),
        };
        tracing::debug!(%topic, "bus subscription registered");
        Ok(Subscription::spawn(topic.clone(), source, queue_capacity))
    }
}

fn nats_request_error(
    topic: &Topic,
    timeout: Duration,
    err: &async_nats::RequestError,
) -> BusError {
    match err.kind() {
        async_nats::RequestErrorKind::TimedOut => BusError::Timeout {
            topic: topic.to_string(),
            timeout,
        },
        async_nats::RequestErrorKind::NoResponders => BusError::NoResponders(topic.to_string()),
        async_nats::RequestErrorKind::Other => BusError::Transport(err.to_string()),
    }
}
