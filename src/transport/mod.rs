//! WebSocket transport layer.
//!
//! This module handles the single outbound connection from the client to
//! the storage service.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                              ┌──────────────────┐
//! │  Connection      │                              │  Storage         │
//! │                  │         WebSocket            │  Service         │
//! │  TransportSession│─────────────────────────────►│                  │
//! │  (event loop)    │   endpoint, sub-protocol     │                  │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! # Session Lifecycle
//!
//! 1. `parse_endpoint` - Validate the configured address
//! 2. `TransportSession::open` - Spawn the handshake and event loop
//! 3. `Opened` / `MessageReceived` events, queued writes
//! 4. `Closed` - Final event; the session refuses writes from here on
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `endpoint` | Endpoint address validation |
//! | `session` | WebSocket session and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// Endpoint address validation.
pub mod endpoint;

/// WebSocket session and event loop.
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use endpoint::parse_endpoint;
pub use session::{DEFAULT_SUB_PROTOCOL, TransportSession};
