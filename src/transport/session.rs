//! WebSocket transport session.
//!
//! A [`TransportSession`] owns one outbound WebSocket connection. The
//! handshake and all socket I/O run in a spawned tokio task; the session
//! handle only queues writes and hands out [`ConnectionEvent`]s in the order
//! they happened.
//!
//! # Event Loop
//!
//! The task:
//!
//! - Performs the handshake with the configured sub-protocol
//! - Emits `Opened`, or `Errored` + `Closed` if the handshake fails
//! - Accepts writes only between `Opened` and `Closed`
//! - Forwards text frames as `MessageReceived`
//! - Writes queued messages
//! - Emits `Closed` exactly once, last, and then refuses further writes

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::connection::MessageSink;
use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::protocol::{CloseInfo, ConnectionEvent};

// ============================================================================
// Constants
// ============================================================================

/// Sub-protocol the storage service expects.
pub const DEFAULT_SUB_PROTOCOL: &str = "dfs";

// ============================================================================
// SessionCommand
// ============================================================================

/// Internal commands for the event loop.
enum SessionCommand {
    /// Write a text message.
    Send(String),
    /// Close the connection.
    Close,
}

// ============================================================================
// TransportSession
// ============================================================================

/// One WebSocket connection to a fixed endpoint.
///
/// The session is established once, at construction, and is never reused:
/// after `Closed` it refuses writes. Dropping it closes the connection.
///
/// Must be created inside a tokio runtime.
pub struct TransportSession {
    /// Connection this session belongs to.
    connection_id: ConnectionId,
    /// Target address.
    endpoint: Url,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    /// Set once the handshake completed, just before `Opened` is emitted.
    open: Arc<AtomicBool>,
    /// Events produced by the event loop.
    event_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
}

impl TransportSession {
    /// Starts connecting to `endpoint` with the given sub-protocol.
    ///
    /// Returns immediately. The outcome of the handshake arrives as the first
    /// event.
    ///
    /// # Errors
    ///
    /// - [`Error::WebSocket`] if the endpoint cannot form a handshake request
    /// - [`Error::Config`] if the sub-protocol is not a valid header value
    pub fn open(connection_id: ConnectionId, endpoint: Url, sub_protocol: &str) -> Result<Self> {
        let request = build_request(&endpoint, sub_protocol)?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));

        debug!(%connection_id, %endpoint, sub_protocol, "Opening transport session");

        tokio::spawn(Self::run_event_loop(
            connection_id,
            request,
            Arc::clone(&open),
            command_rx,
            event_tx,
        ));

        Ok(Self {
            connection_id,
            endpoint,
            command_tx,
            open,
            event_rx,
        })
    }

    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the endpoint address.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once `Closed` has been delivered.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        self.event_rx.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<ConnectionEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Closes the connection.
    ///
    /// `Closed` is still delivered as the final event.
    pub fn close(&self) {
        let _ = self.command_tx.send(SessionCommand::Close);
    }

    /// Event loop that handles the handshake and WebSocket I/O.
    async fn run_event_loop(
        connection_id: ConnectionId,
        request: Request,
        open: Arc<AtomicBool>,
        mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
        event_tx: mpsc::UnboundedSender<ConnectionEvent>,
    ) {
        let emit = |event: ConnectionEvent| {
            trace!(%connection_id, event = event.name(), "Transport event");
            // Receiver is gone when the session was dropped
            let _ = event_tx.send(event);
        };

        let mut handshake = pin!(tokio_tungstenite::connect_async(request));

        let ws_stream = loop {
            tokio::select! {
                result = &mut handshake => match result {
                    Ok((stream, _response)) => break stream,
                    Err(e) => {
                        warn!(%connection_id, error = %e, "WebSocket handshake failed");
                        emit(ConnectionEvent::errored(e.to_string()));
                        Self::finish(connection_id, &mut command_rx, &emit, CloseInfo::default());
                        return;
                    }
                },

                command = command_rx.recv() => match command {
                    Some(SessionCommand::Send(_)) => {
                        warn!(%connection_id, "Message queued before open, dropped");
                    }

                    Some(SessionCommand::Close) | None => {
                        debug!(%connection_id, "Closed during handshake");
                        Self::finish(connection_id, &mut command_rx, &emit, CloseInfo::default());
                        return;
                    }
                },
            }
        };

        info!(%connection_id, "WebSocket connection established");
        open.store(true, Ordering::Release);
        emit(ConnectionEvent::Opened);

        let (mut ws_write, mut ws_read) = ws_stream.split();

        let close_info = loop {
            tokio::select! {
                // Incoming messages from the service
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            emit(ConnectionEvent::MessageReceived(text.as_str().to_owned()));
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(%connection_id, "WebSocket closed by remote");
                            break frame
                                .map(|f| CloseInfo {
                                    code: Some(u16::from(f.code)),
                                    reason: f.reason.as_str().to_owned(),
                                })
                                .unwrap_or_default();
                        }

                        Some(Err(e)) => {
                            error!(%connection_id, error = %e, "WebSocket error");
                            emit(ConnectionEvent::errored(e.to_string()));
                            break CloseInfo::default();
                        }

                        None => {
                            debug!(%connection_id, "WebSocket stream ended");
                            break CloseInfo::default();
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Writes from the dispatcher
                command = command_rx.recv() => {
                    match command {
                        Some(SessionCommand::Send(payload)) => {
                            let len = payload.len();
                            if let Err(e) = ws_write.send(Message::Text(payload.into())).await {
                                error!(%connection_id, error = %e, "WebSocket write failed");
                                emit(ConnectionEvent::errored(e.to_string()));
                                break CloseInfo::default();
                            }
                            trace!(%connection_id, len, "Message sent");
                        }

                        Some(SessionCommand::Close) | None => {
                            debug!(%connection_id, "Close requested");
                            let _ = ws_write.close().await;
                            break CloseInfo {
                                code: Some(u16::from(CloseCode::Normal)),
                                reason: String::new(),
                            };
                        }
                    }
                }
            }
        };

        open.store(false, Ordering::Release);
        Self::finish(connection_id, &mut command_rx, &emit, close_info);
    }

    /// Refuses further writes and emits the final `Closed` event.
    fn finish(
        connection_id: ConnectionId,
        command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>,
        emit: &impl Fn(ConnectionEvent),
        close_info: CloseInfo,
    ) {
        command_rx.close();

        let mut dropped = 0usize;
        while let Ok(command) = command_rx.try_recv() {
            if matches!(command, SessionCommand::Send(_)) {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!(%connection_id, dropped, "Queued messages dropped on close");
        }

        debug!(%connection_id, close = %close_info, "Event loop terminated");
        emit(ConnectionEvent::Closed(close_info));
    }
}

impl MessageSink for TransportSession {
    fn send_text(&self, payload: String) -> bool {
        if !self.open.load(Ordering::Acquire) {
            trace!(connection_id = %self.connection_id, "Write refused, session not open");
            return false;
        }
        self.command_tx.send(SessionCommand::Send(payload)).is_ok()
    }
}

impl fmt::Debug for TransportSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportSession")
            .field("connection_id", &self.connection_id)
            .field("endpoint", &self.endpoint.as_str())
            .field("open", &self.open.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Builds the client handshake request with the sub-protocol header.
fn build_request(endpoint: &Url, sub_protocol: &str) -> Result<Request> {
    let mut request = endpoint.as_str().into_client_request()?;

    let value = HeaderValue::from_str(sub_protocol)
        .map_err(|e| Error::config(format!("Invalid sub-protocol '{sub_protocol}': {e}")))?;
    request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);

    Ok(request)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio_tungstenite::tungstenite::protocol::CloseFrame;

    use crate::transport::testing::TestServer;

    fn open(url: &str) -> TransportSession {
        let endpoint = Url::parse(url).expect("url");
        TransportSession::open(ConnectionId::generate(), endpoint, DEFAULT_SUB_PROTOCOL)
            .expect("open")
    }

    #[test]
    fn test_build_request_sets_sub_protocol() {
        let endpoint = Url::parse("ws://127.0.0.1:9/dfs").expect("url");
        let request = build_request(&endpoint, "dfs").expect("request");

        assert_eq!(
            request
                .headers()
                .get(SEC_WEBSOCKET_PROTOCOL)
                .and_then(|v| v.to_str().ok()),
            Some("dfs")
        );
        assert_eq!(request.uri().path(), "/dfs");
    }

    #[test]
    fn test_build_request_rejects_bad_sub_protocol() {
        let endpoint = Url::parse("ws://127.0.0.1:9").expect("url");
        let err = build_request(&endpoint, "bad\nvalue").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_open_send_and_remote_close() {
        let server = TestServer::bind().await;
        let mut session = open(&server.ws_url());

        let mut remote = server.accept().await;
        assert_eq!(session.next_event().await, Some(ConnectionEvent::Opened));

        assert!(session.send_text("hello".into()));
        let received = remote.next().await.expect("frame").expect("message");
        assert_eq!(received.to_text().expect("text"), "hello");

        remote
            .send(Message::Text("ack".to_owned().into()))
            .await
            .expect("server send");
        assert_eq!(
            session.next_event().await,
            Some(ConnectionEvent::MessageReceived("ack".into()))
        );

        remote
            .close(Some(CloseFrame {
                code: CloseCode::Away,
                reason: "bye".to_owned().into(),
            }))
            .await
            .expect("server close");

        assert_eq!(
            session.next_event().await,
            Some(ConnectionEvent::closed_with(1001, "bye"))
        );
        assert_eq!(session.next_event().await, None);
        assert!(!session.send_text("late".into()));
    }

    #[tokio::test]
    async fn test_writes_refused_until_opened() {
        let server = TestServer::bind().await;
        let mut session = open(&server.ws_url());

        assert!(!session.send_text("too early".into()));

        let mut remote = server.accept().await;
        assert_eq!(session.next_event().await, Some(ConnectionEvent::Opened));

        assert!(session.send_text("on time".into()));
        let received = remote.next().await.expect("frame").expect("message");
        assert_eq!(received.to_text().expect("text"), "on time");
    }

    #[tokio::test]
    async fn test_refused_connection_errors_then_closes() {
        let url = TestServer::unused_ws_url().await;
        let mut session = open(&url);

        assert!(matches!(
            session.next_event().await,
            Some(ConnectionEvent::Errored { .. })
        ));
        assert_eq!(session.next_event().await, Some(ConnectionEvent::closed()));
        assert_eq!(session.next_event().await, None);
    }

    #[tokio::test]
    async fn test_client_close() {
        let server = TestServer::bind().await;
        let mut session = open(&server.ws_url());
        let _remote = server.accept().await;

        assert_eq!(session.next_event().await, Some(ConnectionEvent::Opened));

        session.close();
        assert_eq!(
            session.next_event().await,
            Some(ConnectionEvent::closed_with(1000, ""))
        );
        assert!(!session.send_text("after close".into()));
    }
}
