//! Connection lifecycle.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`ConnectionTracker`] | Authoritative status, observers, send gate |
//! | [`CommandDispatcher`] | Builds and writes store commands |
//! | [`Connection`] | One transport session plus its tracker |
//!
//! Status transitions are driven only by transport events. Nothing here
//! reconnects: a `Disconnected` connection is replaced, not revived.

// ============================================================================
// Submodules
// ============================================================================

/// Connection aggregate.
pub mod core;

/// Command dispatch.
pub mod dispatcher;

/// Status tracking.
pub mod tracker;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Connection;
pub use dispatcher::{CommandDispatcher, MessageSink};
pub use tracker::{ConnectionTracker, DisconnectReason, Status, StatusChange, StatusObserver};
