//! Connection aggregate.
//!
//! A [`Connection`] pairs one [`TransportSession`] with the
//! [`ConnectionTracker`] that consumes its events. It is created once per
//! activation of the control surface and never reused.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;
use url::Url;

use crate::error::{DispatchError, Result};
use crate::identifiers::{ConnectionId, SubscriptionId};
use crate::protocol::CaptureCommand;
use crate::transport::{TransportSession, parse_endpoint};

use super::dispatcher::CommandDispatcher;
use super::tracker::{ConnectionTracker, DisconnectReason, Status, StatusChange};

// ============================================================================
// Connection
// ============================================================================

/// One connection to the storage service.
///
/// Events from the transport are applied by the owner, one at a time, via
/// [`process_next_event`](Self::process_next_event) or
/// [`process_pending_events`](Self::process_pending_events).
///
/// # Example
///
/// ```no_run
/// use dfs_capture::{Connection, Status, DEFAULT_SUB_PROTOCOL};
///
/// # async fn example() -> dfs_capture::Result<()> {
/// let mut connection = Connection::open("ws://127.0.0.1:8080", DEFAULT_SUB_PROTOCOL)?;
/// connection.subscribe(|change| println!("{}", change.message()));
///
/// if connection.settle().await == Status::Connected {
///     connection.dispatch("rust async", "https://tokio.rs", "Tokio")?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection {
    /// Status of this connection.
    tracker: ConnectionTracker,
    /// Owned transport.
    session: TransportSession,
}

impl Connection {
    /// Validates `endpoint` and starts connecting.
    ///
    /// Must be called inside a tokio runtime. The connection starts in
    /// `Connecting`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEndpoint`](crate::Error::InvalidEndpoint) if the address is unusable
    /// - [`Error::Config`](crate::Error::Config) if the sub-protocol is invalid
    pub fn open(endpoint: &str, sub_protocol: &str) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        Self::open_url(endpoint, sub_protocol)
    }

    /// Starts connecting to an already validated endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open), minus endpoint validation.
    pub fn open_url(endpoint: Url, sub_protocol: &str) -> Result<Self> {
        let connection_id = ConnectionId::generate();
        let session = TransportSession::open(connection_id, endpoint, sub_protocol)?;

        Ok(Self {
            tracker: ConnectionTracker::new(connection_id),
            session,
        })
    }

    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.tracker.connection_id()
    }

    /// Returns the endpoint address.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        self.session.endpoint()
    }

    /// Returns the current status without processing queued events.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Status {
        self.tracker.status()
    }

    /// Returns `true` iff the status is `Connected`.
    #[inline]
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.tracker.can_send()
    }

    /// Returns `true` if the connection was open when it closed.
    #[inline]
    #[must_use]
    pub const fn was_connected(&self) -> bool {
        self.tracker.was_connected()
    }

    /// Returns why the connection is `Disconnected`, if it is.
    #[inline]
    #[must_use]
    pub fn disconnect_reason(&self) -> Option<DisconnectReason> {
        self.tracker.disconnect_reason()
    }

    /// Returns the tracker.
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Registers a status observer. See [`ConnectionTracker::subscribe`].
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&StatusChange) + Send + 'static,
    ) -> SubscriptionId {
        self.tracker.subscribe(observer)
    }

    /// Removes a status observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tracker.unsubscribe(id)
    }

    /// Waits for the next transport event and applies it.
    ///
    /// Returns the status afterwards, or `None` once the transport has
    /// delivered its final event.
    pub async fn process_next_event(&mut self) -> Option<Status> {
        let event = self.session.next_event().await?;
        self.tracker.on_event(event);
        Some(self.tracker.status())
    }

    /// Applies every event the transport has already queued.
    ///
    /// Never waits. Returns the number of events applied.
    pub fn process_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.session.try_next_event() {
            self.tracker.on_event(event);
            applied += 1;
        }
        applied
    }

    /// Processes events until the connection leaves `Connecting`.
    ///
    /// There is no timeout: a handshake that never completes keeps this
    /// waiting.
    pub async fn settle(&mut self) -> Status {
        while self.tracker.status() == Status::Connecting {
            if self.process_next_event().await.is_none() {
                break;
            }
        }
        self.tracker.status()
    }

    /// Processes events until the transport is done.
    ///
    /// Returns the disconnect reason.
    pub async fn run_until_closed(&mut self) -> Option<DisconnectReason> {
        while self.process_next_event().await.is_some() {}
        self.tracker.disconnect_reason()
    }

    /// Parses tags and sends a store command.
    ///
    /// Already queued transport events are applied first, so a connection
    /// that has closed in the meantime is reported as such.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::dispatch`].
    pub fn dispatch(
        &mut self,
        raw_tags: &str,
        reference: &str,
        label: &str,
    ) -> std::result::Result<(), DispatchError> {
        self.process_pending_events();
        CommandDispatcher::new(&self.tracker, &self.session).dispatch(raw_tags, reference, label)
    }

    /// Sends an already built capture command.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::send`].
    pub fn send_command(
        &mut self,
        command: CaptureCommand,
    ) -> std::result::Result<(), DispatchError> {
        self.process_pending_events();
        CommandDispatcher::new(&self.tracker, &self.session).send(command)
    }

    /// Closes the connection.
    ///
    /// The resulting `Closed` event still has to be processed.
    pub fn close(&self) {
        debug!(connection_id = %self.id(), "Closing connection");
        self.session.close();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use futures_util::StreamExt;
    use parking_lot::Mutex;

    use crate::protocol::{Command, ConnectionEvent};
    use crate::transport::DEFAULT_SUB_PROTOCOL;
    use crate::transport::testing::TestServer;

    #[tokio::test]
    async fn test_invalid_endpoint_is_rejected_synchronously() {
        let err = Connection::open("http://127.0.0.1:1", DEFAULT_SUB_PROTOCOL).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_before_open_is_refused() {
        let server = TestServer::bind().await;
        let mut connection =
            Connection::open(&server.ws_url(), DEFAULT_SUB_PROTOCOL).expect("open");

        assert_eq!(connection.status(), Status::Connecting);
        let err = connection.dispatch("", "http://x", "X").unwrap_err();
        assert!(err.is_not_connected());
    }

    #[tokio::test]
    async fn test_store_roundtrip_and_connection_lost() {
        let server = TestServer::bind().await;
        let mut connection =
            Connection::open(&server.ws_url(), DEFAULT_SUB_PROTOCOL).expect("open");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        connection.subscribe(move |change| sink.lock().push(change.message()));

        let mut remote = server.accept().await;
        assert_eq!(connection.settle().await, Status::Connected);

        connection
            .dispatch("work, urgent  todo,", "https://example.com", "Example")
            .expect("dispatch");

        let frame = remote.next().await.expect("frame").expect("message");
        let Command::Store(command) =
            Command::decode(frame.to_text().expect("text")).expect("decode");
        assert_eq!(command.reference, "https://example.com");
        assert_eq!(command.label, "Example");
        assert_eq!(command.tags, vec!["work", "urgent", "todo"]);

        drop(remote);

        assert_eq!(
            connection.run_until_closed().await,
            Some(DisconnectReason::ConnectionLost)
        );
        assert!(connection.was_connected());
        assert_eq!(*seen.lock(), vec!["Connected!", "Connection lost!"]);

        let err = connection.dispatch("", "http://x", "X").unwrap_err();
        assert!(err.is_not_connected());
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let url = TestServer::unused_ws_url().await;
        let mut connection = Connection::open(&url, DEFAULT_SUB_PROTOCOL).expect("open");

        assert_eq!(connection.settle().await, Status::Disconnected);
        assert!(!connection.was_connected());
        assert!(connection.tracker().saw_error());
        assert_eq!(
            connection.disconnect_reason(),
            Some(DisconnectReason::ServiceUnavailable)
        );
    }

    #[tokio::test]
    async fn test_dispatch_during_handshake_is_refused_by_transport() {
        let server = TestServer::bind().await;
        let mut connection =
            Connection::open(&server.ws_url(), DEFAULT_SUB_PROTOCOL).expect("open");

        // Tracker believes the connection is open while the socket is not
        connection.tracker.on_event(ConnectionEvent::Opened);
        assert!(connection.can_send());

        let err = connection.dispatch("early", "http://early", "Early").unwrap_err();
        assert!(err.is_not_connected());

        let mut remote = server.accept().await;
        assert_eq!(connection.process_next_event().await, Some(Status::Connected));

        connection
            .dispatch("late", "http://late", "Late")
            .expect("dispatch after open");

        let frame = remote.next().await.expect("frame").expect("message");
        let Command::Store(command) =
            Command::decode(frame.to_text().expect("text")).expect("decode");
        assert_eq!(command.reference, "http://late");
        assert_eq!(command.tags, vec!["late"]);
    }
}
