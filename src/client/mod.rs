//! Capture client and its collaborators.
//!
//! This module provides the front-end session that owns a connection:
//!
//! - [`CaptureClient`] - Activates connections and captures documents
//! - [`ClientBuilder`] - Fluent configuration API
//! - [`ClientOptions`] - Handshake options
//! - [`SettingsStore`] - File-backed endpoint settings
//! - [`DocumentSource`] - Supplies the document to capture

// ============================================================================
// Submodules
// ============================================================================

/// Client builder.
pub mod builder;

/// Capture client.
pub mod core;

/// Active document source.
pub mod document;

/// Connection options.
pub mod options;

/// Endpoint providers and settings store.
pub mod settings;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::builder::ClientBuilder;
pub use self::core::CaptureClient;
pub use self::document::{ActiveDocument, DocumentSource, StaticDocument};
pub use self::options::ClientOptions;
pub use self::settings::{ENDPOINT_KEY, EndpointProvider, SettingsStore, StaticEndpoint};
