//! Protocol message types.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Command`] | Local → Remote | Store request, one JSON object per message |
//! | text payload | Remote → Local | Logged, not interpreted |
//!
//! [`ConnectionEvent`] is the internal vocabulary the transport session uses
//! to report socket activity.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Outbound commands and tag parsing |
//! | `event` | Connection events |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound command definitions.
pub mod command;

/// Connection event types.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{CaptureCommand, Command, parse_tags};
pub use event::{CloseInfo, ConnectionEvent};
