//! Error types for the capture client.
//!
//! Two enums live here:
//!
//! - [`enum@Error`] covers configuration, collaborators and the transport.
//! - [`DispatchError`] is returned synchronously by command dispatch and
//!   always means "nothing was sent".
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidEndpoint`] |
//! | Collaborators | [`Error::Settings`], [`Error::Document`] |
//! | Connection | [`Error::TransportUnavailable`], [`Error::Dispatch`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::connection::Status;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client options or builder input are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Endpoint address is not a usable WebSocket URL.
    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// The rejected address.
        endpoint: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// Settings store error.
    ///
    /// Returned when stored settings are missing or malformed.
    #[error("Settings error: {message}")]
    Settings {
        /// Description of the settings error.
        message: String,
    },

    /// The active document could not be read.
    #[error("Document error: {message}")]
    Document {
        /// Description of the document error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// No live connection exists.
    ///
    /// Returned when the client was never activated or was deactivated.
    /// A connection that opened and later closed still exists and reports
    /// its status instead.
    #[error("Transport unavailable")]
    TransportUnavailable,

    /// Command dispatch failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// DispatchError
// ============================================================================

/// Error returned by command dispatch.
///
/// Every variant guarantees that no transport write took place.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The connection is not open.
    #[error("Not connected (status: {status})")]
    NotConnected {
        /// Status observed at dispatch time.
        status: Status,
    },

    /// The command is missing a required field.
    #[error("Invalid command: {message}")]
    InvalidCommand {
        /// Description of the missing or invalid field.
        message: String,
    },

    /// The command could not be encoded.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid endpoint error.
    #[inline]
    pub fn invalid_endpoint(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a settings error.
    #[inline]
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    /// Creates a document error.
    #[inline]
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }
}

impl DispatchError {
    /// Creates a not connected error.
    #[inline]
    pub fn not_connected(status: Status) -> Self {
        Self::NotConnected { status }
    }

    /// Creates an invalid command error.
    #[inline]
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::TransportUnavailable
                | Self::Dispatch(DispatchError::NotConnected { .. })
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if activating again with a fresh connection can clear
    /// this error.
    ///
    /// Nothing is retried automatically. WebSocket errors caused by a
    /// malformed handshake request fail the same way on every attempt and
    /// are not recoverable; neither are configuration errors.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::TransportUnavailable | Self::Dispatch(DispatchError::NotConnected { .. }) => true,
            Self::WebSocket(e) => !matches!(e, WsError::Url(_) | WsError::HttpFormat(_)),
            _ => false,
        }
    }
}

impl DispatchError {
    /// Returns `true` if the command was refused because the connection is
    /// not open.
    #[inline]
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_endpoint("http://x", "scheme must be ws or wss");
        assert_eq!(
            err.to_string(),
            "Invalid endpoint 'http://x': scheme must be ws or wss"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("sub-protocol is empty");
        assert_eq!(err.to_string(), "Configuration error: sub-protocol is empty");
    }

    #[test]
    fn test_not_connected_display() {
        let err = DispatchError::not_connected(Status::Connecting);
        assert_eq!(err.to_string(), "Not connected (status: connecting)");
        assert!(err.is_not_connected());
    }

    #[test]
    fn test_dispatch_error_is_transparent() {
        let err: Error = DispatchError::invalid_command("reference is empty").into();
        assert_eq!(err.to_string(), "Invalid command: reference is empty");
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_is_connection_error() {
        let unavailable = Error::TransportUnavailable;
        let not_connected: Error = DispatchError::not_connected(Status::Disconnected).into();
        let other = Error::settings("missing endpoint");

        assert!(unavailable.is_connection_error());
        assert!(not_connected.is_connection_error());
        assert!(!other.is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        use tokio_tungstenite::tungstenite::error::UrlError;

        let not_connected: Error = DispatchError::not_connected(Status::Disconnected).into();
        assert!(not_connected.is_recoverable());
        assert!(Error::TransportUnavailable.is_recoverable());
        assert!(Error::WebSocket(WsError::ConnectionClosed).is_recoverable());

        let bad_request = Error::WebSocket(WsError::Url(UrlError::NoHostName));
        assert!(bad_request.is_connection_error());
        assert!(!bad_request.is_recoverable());

        let invalid: Error = DispatchError::invalid_command("reference is empty").into();
        assert!(!invalid.is_recoverable());
        assert!(!Error::config("bad sub-protocol").is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
