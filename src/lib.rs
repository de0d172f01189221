//! DFS Capture - Capture-and-sync client for a document storage service.
//!
//! This library captures the document a user is looking at (its source URL,
//! a title and user-entered tags) and sends it as a store command to a
//! storage service over a persistent WebSocket connection.
//!
//! # Architecture
//!
//! The client is the local end of a single outbound connection:
//!
//! - **Local End (Rust)**: Tracks connection status, sends store commands
//! - **Remote End (Service)**: Accepts the `dfs` sub-protocol, stores documents
//!
//! Key design principles:
//!
//! - Each [`Connection`] owns: one transport session + one status tracker
//! - Status changes only in response to transport events
//! - Commands are sent only while the connection is `Connected`
//! - A lost connection is never revived; activating again builds a new one
//!
//! # Quick Start
//!
//! ```no_run
//! use dfs_capture::{CaptureClient, Result, Status};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = CaptureClient::builder()
//!         .endpoint("ws://127.0.0.1:8080")
//!         .build()?;
//!
//!     let connection = client.activate().await?;
//!     connection.subscribe(|change| println!("{}", change.message()));
//!
//!     if client.settle().await? == Status::Connected {
//!         client.dispatch("rust, async", "https://tokio.rs", "Tokio")?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Capture client, builder, settings, document source |
//! | [`connection`] | Status tracker, command dispatcher, [`Connection`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Store command wire format and connection events |
//! | [`transport`] | WebSocket session and endpoint validation |

// ============================================================================
// Modules
// ============================================================================

/// Capture client and its collaborators.
///
/// Use [`CaptureClient::builder()`] to create a configured client.
pub mod client;

/// Connection lifecycle.
///
/// This module contains the core types for status tracking:
///
/// - [`ConnectionTracker`] - Status, observers and the send gate
/// - [`CommandDispatcher`] - Builds and writes store commands
/// - [`Connection`] - Transport session plus tracker
pub mod connection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Protocol message types.
///
/// Defines the store command wire format and the connection events.
pub mod protocol;

/// WebSocket transport layer.
///
/// Handles the outbound WebSocket session and its event loop.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    ActiveDocument, CaptureClient, ClientBuilder, ClientOptions, DocumentSource, EndpointProvider,
    SettingsStore, StaticDocument, StaticEndpoint,
};

// Connection types
pub use connection::{
    CommandDispatcher, Connection, ConnectionTracker, DisconnectReason, MessageSink, Status,
    StatusChange,
};

// Error types
pub use error::{DispatchError, Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, SubscriptionId};

// Protocol types
pub use protocol::{CaptureCommand, Command, ConnectionEvent, parse_tags};

// Transport types
pub use transport::{DEFAULT_SUB_PROTOCOL, TransportSession, parse_endpoint};
