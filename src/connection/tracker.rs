//! Connection state tracking.
//!
//! [`ConnectionTracker`] owns the single authoritative [`Status`] of one
//! connection instance and gates command transmission.
//!
//! # State Machine
//!
//! ```text
//!  Connecting ──Opened──► Connected ──Closed──► Disconnected
//!      │                                            ▲
//!      └──────────────────Closed────────────────────┘
//! ```
//!
//! `Disconnected` is terminal. `Errored` is logged but never moves the state
//! by itself; the `Closed` that follows it does.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::{debug, info, trace, warn};

use crate::identifiers::{ConnectionId, SubscriptionId};
use crate::protocol::ConnectionEvent;

// ============================================================================
// Types
// ============================================================================

/// Status observer callback type.
///
/// Called synchronously, in subscription order, for every status transition.
pub type StatusObserver = Box<dyn FnMut(&StatusChange) + Send>;

// ============================================================================
// Status
// ============================================================================

/// Connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Handshake in progress. Initial state.
    #[default]
    Connecting,
    /// Open and writable.
    Connected,
    /// Closed. Terminal for this connection instance.
    Disconnected,
}

impl Status {
    /// Returns the text a presenter shows for this status.
    ///
    /// For `Disconnected` prefer [`DisconnectReason::message`], which tells
    /// a lost connection apart from an unreachable service.
    #[inline]
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected!",
            Self::Disconnected => "Disconnected!",
        }
    }

    /// Returns `true` for the terminal status.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        })
    }
}

// ============================================================================
// DisconnectReason
// ============================================================================

/// Why a connection ended up `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisconnectReason {
    /// The connection was open and then closed.
    ConnectionLost,
    /// The connection closed before it ever opened.
    ServiceUnavailable,
}

impl DisconnectReason {
    /// Returns the text a presenter shows for this reason.
    #[inline]
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ConnectionLost => "Connection lost!",
            Self::ServiceUnavailable => "Service not available!",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConnectionLost => "connection lost",
            Self::ServiceUnavailable => "service unavailable",
        })
    }
}

// ============================================================================
// StatusChange
// ============================================================================

/// A status transition, as delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the transition.
    pub previous: Status,
    /// Status after the transition.
    pub current: Status,
    /// Set when `current` is `Disconnected`.
    pub reason: Option<DisconnectReason>,
}

impl StatusChange {
    /// Returns the text a presenter shows after this transition.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.reason
            .as_ref()
            .map_or_else(|| self.current.message(), DisconnectReason::message)
    }
}

// ============================================================================
// ConnectionTracker
// ============================================================================

/// Tracks the status of one connection instance.
///
/// Events are applied one at a time through [`on_event`](Self::on_event),
/// which takes `&mut self`: observers cannot reach the tracker while it is
/// notifying them, so event delivery is never re-entrant.
pub struct ConnectionTracker {
    /// Connection this tracker belongs to, for log correlation.
    connection_id: ConnectionId,
    /// Current status.
    status: Status,
    /// Whether the connection was open when it closed.
    was_connected: bool,
    /// Set once any `Errored` event was seen.
    saw_error: bool,
    /// Registered observers, in subscription order.
    observers: Vec<(SubscriptionId, StatusObserver)>,
    /// Next subscription counter value.
    next_subscription: u64,
}

impl ConnectionTracker {
    /// Creates a tracker in the `Connecting` state.
    #[must_use]
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            status: Status::Connecting,
            was_connected: false,
            saw_error: false,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns `true` iff the status is `Connected`.
    #[inline]
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.status == Status::Connected
    }

    /// Returns `true` if the connection was open when it closed.
    ///
    /// Always `false` before the connection is `Disconnected`.
    #[inline]
    #[must_use]
    pub const fn was_connected(&self) -> bool {
        self.was_connected
    }

    /// Returns `true` if the transport reported an error at any point.
    #[inline]
    #[must_use]
    pub const fn saw_error(&self) -> bool {
        self.saw_error
    }

    /// Returns why the connection is `Disconnected`, if it is.
    #[inline]
    #[must_use]
    pub fn disconnect_reason(&self) -> Option<DisconnectReason> {
        if !self.status.is_terminal() {
            return None;
        }

        Some(if self.was_connected {
            DisconnectReason::ConnectionLost
        } else {
            DisconnectReason::ServiceUnavailable
        })
    }

    /// Returns the number of registered observers.
    #[inline]
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Registers a status observer.
    ///
    /// The observer is called for transitions that happen after this call.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&StatusChange) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));

        trace!(connection_id = %self.connection_id, %id, "Status observer subscribed");

        id
    }

    /// Removes a status observer.
    ///
    /// Returns `false` if the ID is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Applies one transport event.
    ///
    /// Observers are notified before this returns. Returns the transition,
    /// if the event caused one.
    pub fn on_event(&mut self, event: ConnectionEvent) -> Option<StatusChange> {
        let connection_id = self.connection_id;

        match event {
            ConnectionEvent::Opened => match self.status {
                Status::Connecting => {
                    info!(%connection_id, "Connection opened");
                    Some(self.transition(Status::Connected))
                }
                Status::Connected => {
                    debug!(%connection_id, "Duplicate open ignored");
                    None
                }
                Status::Disconnected => {
                    warn!(%connection_id, "Open after close ignored");
                    None
                }
            },

            ConnectionEvent::Closed(info) => {
                if self.status.is_terminal() {
                    debug!(%connection_id, %info, "Duplicate close ignored");
                    return None;
                }

                self.was_connected = self.status == Status::Connected;
                let change = self.transition(Status::Disconnected);

                if self.was_connected {
                    warn!(%connection_id, %info, saw_error = self.saw_error, "Connection lost");
                } else {
                    warn!(%connection_id, %info, saw_error = self.saw_error, "Service not available");
                }

                Some(change)
            }

            ConnectionEvent::Errored { message } => {
                self.saw_error = true;
                warn!(%connection_id, status = %self.status, error = %message, "Transport error");
                None
            }

            ConnectionEvent::MessageReceived(payload) => {
                debug!(%connection_id, len = payload.len(), %payload, "Message received");
                None
            }
        }
    }

    /// Moves to `next` and notifies observers.
    fn transition(&mut self, next: Status) -> StatusChange {
        let previous = self.status;
        self.status = next;

        let change = StatusChange {
            previous,
            current: next,
            reason: self.disconnect_reason(),
        };

        debug!(
            connection_id = %self.connection_id,
            from = %change.previous,
            to = %change.current,
            observers = self.observers.len(),
            "Status changed"
        );

        for (_, observer) in &mut self.observers {
            observer(&change);
        }

        change
    }
}

impl fmt::Debug for ConnectionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTracker")
            .field("connection_id", &self.connection_id)
            .field("status", &self.status)
            .field("was_connected", &self.was_connected)
            .field("saw_error", &self.saw_error)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
