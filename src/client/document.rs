//! Active document source.
//!
//! The client captures whatever document the host currently shows. The host
//! exposes it through [`DocumentSource`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};

// ============================================================================
// ActiveDocument
// ============================================================================

/// Title and source reference of the document being captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    /// Document title.
    pub title: String,
    /// Source URL.
    pub reference: String,
}

impl ActiveDocument {
    /// Creates an active document.
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            reference: reference.into(),
        }
    }
}

// ============================================================================
// DocumentSource
// ============================================================================

/// Supplies the active document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Returns the document currently in focus.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] if no document is active.
    async fn active_document(&self) -> Result<ActiveDocument>;
}

#[async_trait]
impl<T: DocumentSource + ?Sized> DocumentSource for Arc<T> {
    async fn active_document(&self) -> Result<ActiveDocument> {
        (**self).active_document().await
    }
}

// ============================================================================
// StaticDocument
// ============================================================================

/// A document source the host updates as focus changes.
#[derive(Debug, Default)]
pub struct StaticDocument {
    current: Mutex<Option<ActiveDocument>>,
}

impl StaticDocument {
    /// Creates a source with no active document.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source showing `document`.
    #[inline]
    #[must_use]
    pub fn with_document(document: ActiveDocument) -> Self {
        Self {
            current: Mutex::new(Some(document)),
        }
    }

    /// Replaces the active document.
    pub fn set(&self, document: ActiveDocument) {
        *self.current.lock() = Some(document);
    }

    /// Clears the active document.
    pub fn clear(&self) {
        *self.current.lock() = None;
    }
}

#[async_trait]
impl DocumentSource for StaticDocument {
    async fn active_document(&self) -> Result<ActiveDocument> {
        self.current
            .lock()
            .clone()
            .ok_or_else(|| Error::document("No active document"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_document() {
        let source = StaticDocument::new();
        assert!(matches!(
            source.active_document().await,
            Err(Error::Document { .. })
        ));

        source.set(ActiveDocument::new("Tokio", "https://tokio.rs"));
        let document = source.active_document().await.expect("document");
        assert_eq!(document.title, "Tokio");
        assert_eq!(document.reference, "https://tokio.rs");

        source.clear();
        assert!(source.active_document().await.is_err());
    }
}
