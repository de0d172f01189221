//! Command dispatch.
//!
//! [`CommandDispatcher`] turns a user action into a single outbound message.
//! It asks the tracker first and never writes to a connection that is not
//! open. Writes are fire-and-forget: there is no acknowledgment and no retry.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::protocol::{CaptureCommand, Command};

use super::tracker::{ConnectionTracker, Status};

// ============================================================================
// MessageSink
// ============================================================================

/// Write side of a transport.
///
/// The dispatcher is the only caller.
pub trait MessageSink {
    /// Queues one text message for sending.
    ///
    /// Returns `false` if the transport is not open (still handshaking or
    /// already terminated) and the message was not queued.
    fn send_text(&self, payload: String) -> bool;
}

// ============================================================================
// CommandDispatcher
// ============================================================================

/// Builds capture commands and writes them through a [`MessageSink`],
/// gated by a [`ConnectionTracker`].
pub struct CommandDispatcher<'a, S: MessageSink + ?Sized> {
    /// Status gate.
    tracker: &'a ConnectionTracker,
    /// Transport write path.
    sink: &'a S,
}

impl<'a, S: MessageSink + ?Sized> CommandDispatcher<'a, S> {
    /// Creates a dispatcher over a tracker and a sink.
    #[inline]
    #[must_use]
    pub fn new(tracker: &'a ConnectionTracker, sink: &'a S) -> Self {
        Self { tracker, sink }
    }

    /// Parses tags, builds a store command and sends it.
    ///
    /// # Arguments
    ///
    /// * `raw_tags` - Free-form tag input, see [`parse_tags`](crate::protocol::parse_tags)
    /// * `reference` - Source URL of the item
    /// * `label` - Title of the item
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NotConnected`] if the connection is not open
    /// - [`DispatchError::InvalidCommand`] if `reference` is empty
    /// - [`DispatchError::Encode`] if the command cannot be serialized
    pub fn dispatch(
        &self,
        raw_tags: &str,
        reference: &str,
        label: &str,
    ) -> Result<(), DispatchError> {
        self.send(CaptureCommand::new(reference, label, raw_tags))
    }

    /// Sends an already built capture command.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    pub fn send(&self, command: CaptureCommand) -> Result<(), DispatchError> {
        let connection_id = self.tracker.connection_id();

        if !self.tracker.can_send() {
            let status = self.tracker.status();
            debug!(%connection_id, %status, "Dispatch refused, not connected");
            return Err(DispatchError::not_connected(status));
        }

        if command.reference.is_empty() {
            return Err(DispatchError::invalid_command("reference is empty"));
        }

        let tags = command.tags.len();
        let url = command.reference.clone();
        let payload = Command::from(command).encode()?;

        if !self.sink.send_text(payload) {
            warn!(%connection_id, "Dispatch refused, transport not open");
            return Err(DispatchError::not_connected(Status::Disconnected));
        }

        info!(%connection_id, %url, tags, "Store command sent");

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
