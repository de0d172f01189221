//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`CaptureClient`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dfs_capture::{CaptureClient, SettingsStore};
//!
//! # fn example() -> dfs_capture::Result<()> {
//! let settings = Arc::new(SettingsStore::open("settings.json")?);
//! let client = CaptureClient::builder()
//!     .endpoint_provider(settings)
//!     .sub_protocol("dfs")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::core::CaptureClient;
use super::document::DocumentSource;
use super::options::ClientOptions;
use super::settings::{EndpointProvider, StaticEndpoint};

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`CaptureClient`] instance.
///
/// Use [`CaptureClient::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ClientBuilder {
    /// Source of the endpoint address.
    endpoints: Option<Arc<dyn EndpointProvider>>,
    /// Source of the document to capture.
    documents: Option<Arc<dyn DocumentSource>>,
    /// Connection options.
    options: ClientOptions,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default options and no collaborators.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed endpoint address.
    ///
    /// The address is validated on activation.
    #[inline]
    #[must_use]
    pub fn endpoint(self, address: impl Into<String>) -> Self {
        self.endpoint_provider(StaticEndpoint::new(address))
    }

    /// Reads the endpoint address from `provider` on every activation.
    #[inline]
    #[must_use]
    pub fn endpoint_provider(mut self, provider: impl EndpointProvider + 'static) -> Self {
        self.endpoints = Some(Arc::new(provider));
        self
    }

    /// Sets the source of the document to capture.
    #[inline]
    #[must_use]
    pub fn document_source(mut self, source: impl DocumentSource + 'static) -> Self {
        self.documents = Some(Arc::new(source));
        self
    }

    /// Sets the sub-protocol offered in the handshake.
    #[inline]
    #[must_use]
    pub fn sub_protocol(mut self, sub_protocol: impl Into<String>) -> Self {
        self.options = self.options.with_sub_protocol(sub_protocol);
        self
    }

    /// Replaces all connection options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no endpoint source was set
    /// - [`Error::Config`] if the options are invalid
    pub fn build(self) -> Result<CaptureClient> {
        let endpoints = self.endpoints.ok_or_else(|| {
            Error::config(
                "An endpoint is required. Use .endpoint() or .endpoint_provider() to set it.\n\
                 Example: CaptureClient::builder().endpoint(\"ws://127.0.0.1:8080\")",
            )
        })?;

        self.options.validate()?;

        Ok(CaptureClient::new(endpoints, self.documents, self.options))
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("has_endpoint", &self.endpoints.is_some())
            .field("has_document_source", &self.documents.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
