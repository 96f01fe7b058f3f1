//! Lifecycle of one WebSocket-to-subscription binding.
//!
//! ```text
//! Connecting ──► Subscribed ──► Closing ──► Closed
//!      └──────────────────────────────────────┘
//!                 (subscribe failed)
//! ```
//!
//! No state leads back to `Subscribed`; a client that wants to resume has
//! to open a new connection.

use std::fmt;

use uuid::Uuid;

use crate::domain::Topic;

/// State of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Upgraded, bus subscription not yet registered.
    Connecting,
    /// Forwarding bus messages to the socket.
    Subscribed,
    /// Teardown started; the subscription is being cancelled.
    Closing,
    /// Subscription cancelled, nothing in flight.
    Closed,
}

impl BindingState {
    /// Returns `true` if moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Subscribed)
                | (Self::Connecting, Self::Closed)
                | (Self::Subscribed, Self::Closing)
                | (Self::Closing, Self::Closed)
        )
    }
}

/// Why a subscribed binding started closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent a close frame or the stream ended.
    ClientClosed,
    /// Reading from the socket failed.
    ReadFailed,
    /// Writing a delivery to the socket failed.
    WriteFailed,
    /// The bus ended the subscription.
    SubscriptionEnded,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ClientClosed => "client closed",
            Self::ReadFailed => "socket read failed",
            Self::WriteFailed => "socket write failed",
            Self::SubscriptionEnded => "subscription ended",
        };
        f.write_str(s)
    }
}

/// Identity and state of one connection binding.
#[derive(Debug)]
pub struct Binding {
    id: Uuid,
    topic: Topic,
    state: BindingState,
}

impl Binding {
    /// Starts a binding for `topic` in [`BindingState::Connecting`].
    #[must_use]
    pub fn new(topic: Topic) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic,
            state: BindingState::Connecting,
        }
    }

    /// Connection identifier used in logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Topic the binding is for.
    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BindingState {
        self.state
    }

    /// Moves to `next` if the transition is allowed.
    ///
    /// Returns `false` and leaves the state untouched otherwise.
    pub fn advance(&mut self, next: BindingState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                id = %self.id,
                from = ?self.state,
                to = ?next,
                "rejected binding transition"
            );
            return false;
        }
        tracing::debug!(id = %self.id, topic = %self.topic, from = ?self.state, to = ?next, "binding transition");
        self.state = next;
        true
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn binding() -> Binding {
        let Ok(topic) = Topic::parse("alerts") else {
            panic!("valid topic rejected");
        };
        Binding::new(topic)
    }

    #[test]
    fn starts_connecting() {
        let b = binding();
        assert_eq!(b.state(), BindingState::Connecting);
        assert_eq!(b.topic().as_str(), "alerts");
    }

    #[test]
    fn full_lifecycle() {
        let mut b = binding();
        assert!(b.advance(BindingState::Subscribed));
        assert!(b.advance(BindingState::Closing));
        assert!(b.advance(BindingState::Closed));
        assert_eq!(b.state(), BindingState::Closed);
    }

    #[test]
    fn subscribe_failure_goes_straight_to_closed() {
        let mut b = binding();
        assert!(b.advance(BindingState::Closed));
    }

    #[test]
    fn never_resubscribes() {
        let mut b = binding();
        b.advance(BindingState::Subscribed);
        b.advance(BindingState::Closing);
        assert!(!b.advance(BindingState::Subscribed));
        b.advance(BindingState::Closed);
        assert!(!b.advance(BindingState::Subscribed));
        assert_eq!(b.state(), BindingState::Closed);
    }

    #[test]
    fn cannot_skip_closing() {
        let mut b = binding();
        b.advance(BindingState::Subscribed);
        assert!(!b.advance(BindingState::Closed));
        assert_eq!(b.state(), BindingState::Subscribed);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(binding().id(), binding().id());
    }

    #[test]
    fn close_reason_display() {
        assert_eq!(CloseReason::WriteFailed.to_string(), "socket write failed");
    }
}
