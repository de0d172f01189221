//! Capture client: the control-surface session.
//!
//! A [`CaptureClient`] is what a popup or command-line front end holds. Each
//! [`activate`](CaptureClient::activate) reads the endpoint, builds a fresh
//! [`Connection`] and swaps it in place of the previous one. Connections are
//! never revived; a lost connection is recovered by activating again.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::connection::{Connection, Status};
use crate::error::{Error, Result};

use super::builder::ClientBuilder;
use super::document::DocumentSource;
use super::options::ClientOptions;
use super::settings::EndpointProvider;

// ============================================================================
// CaptureClient
// ============================================================================

/// Owns at most one live [`Connection`] and the collaborators it is built
/// from.
///
/// # Example
///
/// ```no_run
/// use dfs_capture::{CaptureClient, Status};
///
/// # async fn example() -> dfs_capture::Result<()> {
/// let mut client = CaptureClient::builder()
///     .endpoint("ws://127.0.0.1:8080")
///     .build()?;
///
/// client.activate().await?;
/// if client.settle().await? == Status::Connected {
///     client.dispatch("reading rust", "https://doc.rust-lang.org", "The Book")?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct CaptureClient {
    /// Source of the endpoint address.
    endpoints: Arc<dyn EndpointProvider>,
    /// Source of the document to capture.
    documents: Option<Arc<dyn DocumentSource>>,
    /// Options for every connection.
    options: ClientOptions,
    /// Connection of the current activation.
    connection: Option<Connection>,
}

impl CaptureClient {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from validated parts.
    pub(crate) fn new(
        endpoints: Arc<dyn EndpointProvider>,
        documents: Option<Arc<dyn DocumentSource>>,
        options: ClientOptions,
    ) -> Self {
        Self {
            endpoints,
            documents,
            options,
            connection: None,
        }
    }

    /// Returns the client options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Returns the current connection, if activated.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Returns the current connection mutably, if activated.
    #[inline]
    pub fn connection_mut(&mut self) -> Option<&mut Connection> {
        self.connection.as_mut()
    }

    /// Returns the status of the current connection.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.connection.as_ref().map(Connection::status)
    }

    /// Returns `true` if the current connection can send.
    #[inline]
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::can_send)
    }

    /// Opens a fresh connection to the provider's endpoint.
    ///
    /// The new connection replaces the previous one only once it was created
    /// successfully; the previous one is then closed.
    ///
    /// # Errors
    ///
    /// - [`Error::Settings`] if the provider has no endpoint
    /// - [`Error::InvalidEndpoint`] if the endpoint is unusable
    pub async fn activate(&mut self) -> Result<&mut Connection> {
        let address = self.endpoints.endpoint_address().await?;
        let connection = Connection::open(&address, &self.options.sub_protocol)?;

        info!(
            connection_id = %connection.id(),
            endpoint = %connection.endpoint(),
            "Client activated"
        );

        if let Some(previous) = self.connection.replace(connection) {
            debug!(connection_id = %previous.id(), "Replacing previous connection");
            previous.close();
        }

        self.connection.as_mut().ok_or(Error::TransportUnavailable)
    }

    /// Closes and drops the current connection.
    pub fn deactivate(&mut self) {
        if let Some(connection) = self.connection.take() {
            info!(connection_id = %connection.id(), "Client deactivated");
            connection.close();
        }
    }

    /// Waits until the current connection leaves `Connecting`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportUnavailable`] if not activated.
    pub async fn settle(&mut self) -> Result<Status> {
        let connection = self.connection.as_mut().ok_or(Error::TransportUnavailable)?;
        Ok(connection.settle().await)
    }

    /// Sends a store command over the current connection.
    ///
    /// # Errors
    ///
    /// - [`Error::TransportUnavailable`] if not activated
    /// - [`Error::Dispatch`] if the connection refused the command
    pub fn dispatch(&mut self, raw_tags: &str, reference: &str, label: &str) -> Result<()> {
        let connection = self.connection.as_mut().ok_or(Error::TransportUnavailable)?;
        connection.dispatch(raw_tags, reference, label)?;
        Ok(())
    }

    /// Captures the active document.
    ///
    /// `title` overrides the document title, e.g. after the user edited it.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no document source is configured
    /// - [`Error::Document`] if no document is active
    /// - Same as [`dispatch`](Self::dispatch)
    pub async fn capture(&mut self, raw_tags: &str, title: Option<&str>) -> Result<()> {
        let documents = self
            .documents
            .as_ref()
            .ok_or_else(|| Error::config("No document source configured"))?;
        let document = documents.active_document().await?;

        let label = title.unwrap_or(document.title.as_str());
        self.dispatch(raw_tags, &document.reference, label)
    }
}

impl fmt::Debug for CaptureClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureClient")
            .field("options", &self.options)
            .field("has_document_source", &self.documents.is_some())
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
