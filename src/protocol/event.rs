//! Connection event vocabulary.
//!
//! The transport session translates raw socket activity into these events.
//! Each event is consumed exactly once by the connection tracker.
//!
//! | Raw activity | Event |
//! |--------------|-------|
//! | Handshake completed | [`ConnectionEvent::Opened`] |
//! | Close frame, end of stream | [`ConnectionEvent::Closed`] |
//! | Handshake, read or write failure | [`ConnectionEvent::Errored`] |
//! | Text frame | [`ConnectionEvent::MessageReceived`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// ConnectionEvent
// ============================================================================

/// An event produced by the transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The connection is open and writable.
    Opened,

    /// The connection closed. No further events follow.
    Closed(CloseInfo),

    /// The transport reported a failure.
    ///
    /// Always followed by [`ConnectionEvent::Closed`].
    Errored {
        /// Diagnostic message.
        message: String,
    },

    /// A text message arrived from the remote service.
    MessageReceived(String),
}

impl ConnectionEvent {
    /// Creates a closed event without a close frame.
    #[inline]
    #[must_use]
    pub fn closed() -> Self {
        Self::Closed(CloseInfo::default())
    }

    /// Creates a closed event from a close frame.
    #[inline]
    #[must_use]
    pub fn closed_with(code: u16, reason: impl Into<String>) -> Self {
        Self::Closed(CloseInfo {
            code: Some(code),
            reason: reason.into(),
        })
    }

    /// Creates an errored event.
    #[inline]
    #[must_use]
    pub fn errored(message: impl Into<String>) -> Self {
        Self::Errored {
            message: message.into(),
        }
    }

    /// Returns the event name used in log output.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Opened => "open",
            Self::Closed(_) => "close",
            Self::Errored { .. } => "error",
            Self::MessageReceived(_) => "message",
        }
    }
}

// ============================================================================
// CloseInfo
// ============================================================================

/// Details of a connection close.
///
/// `code` is `None` when the connection ended without a close frame, e.g.
/// when the handshake failed or the stream was cut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code sent by the peer.
    pub code: Option<u16>,
    /// Close reason sent by the peer.
    pub reason: String,
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) if self.reason.is_empty() => write!(f, "code {code}"),
            Some(code) => write!(f, "code {code}: {}", self.reason),
            None => f.write_str("no close frame"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
