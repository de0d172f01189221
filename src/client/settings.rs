//! Endpoint providers and the settings store.
//!
//! The client reads its endpoint through [`EndpointProvider`] each time it
//! activates. [`SettingsStore`] is the file-backed provider: a flat JSON
//! object of user settings, written by an options page and read by the
//! client.
//!
//! # Format
//!
//! ```json
//! {
//!   "endpoint": "ws://127.0.0.1:8080"
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Settings key holding the endpoint address.
pub const ENDPOINT_KEY: &str = "endpoint";

// ============================================================================
// EndpointProvider
// ============================================================================

/// Supplies the address the client connects to.
#[async_trait]
pub trait EndpointProvider: Send + Sync {
    /// Returns the endpoint address as entered by the user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Settings`] if no address is available.
    async fn endpoint_address(&self) -> Result<String>;
}

#[async_trait]
impl<T: EndpointProvider + ?Sized> EndpointProvider for Arc<T> {
    async fn endpoint_address(&self) -> Result<String> {
        (**self).endpoint_address().await
    }
}

// ============================================================================
// StaticEndpoint
// ============================================================================

/// A fixed endpoint address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEndpoint(String);

impl StaticEndpoint {
    /// Creates a provider that always returns `address`.
    #[inline]
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

#[async_trait]
impl EndpointProvider for StaticEndpoint {
    async fn endpoint_address(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

// ============================================================================
// SettingsStore
// ============================================================================

/// File-backed key/value settings.
///
/// Values are arbitrary JSON. Every change is written through to disk
/// atomically, so a reader never sees a half-written file.
#[derive(Debug)]
pub struct SettingsStore {
    /// Backing file.
    path: PathBuf,
    /// Current values.
    values: Mutex<FxHashMap<String, Value>>,
}

impl SettingsStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is treated as empty settings; it is created on the
    /// first write.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file exists but cannot be read
    /// - [`Error::Settings`] if the file is not a JSON object
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => FxHashMap::default(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::settings(format!(
                    "Settings file {} is not a JSON object: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => FxHashMap::default(),
            Err(e) => return Err(Error::Io(e)),
        };

        debug!(path = %path.display(), keys = values.len(), "Settings loaded");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Returns the backing file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    /// Stores `value` under `key` and writes the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Json`] if the file cannot be written.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let mut values = self.values.lock();
        values.insert(key.into(), value.into());
        self.persist(&values)
    }

    /// Removes `key` and writes the file.
    ///
    /// Returns `false` if the key was not present; the file is then left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Json`] if the file cannot be written.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut values = self.values.lock();
        if values.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&values)?;
        Ok(true)
    }

    /// Returns the stored endpoint address.
    ///
    /// Non-string values are ignored.
    #[must_use]
    pub fn endpoint(&self) -> Option<String> {
        self.values
            .lock()
            .get(ENDPOINT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Stores the endpoint address exactly as entered.
    ///
    /// The address is validated when a connection is opened, not here, so
    /// partially typed input can be saved.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn set_endpoint(&self, address: &str) -> Result<()> {
        self.set(ENDPOINT_KEY, address)
    }

    /// Writes `values` to a temp file next to the target, then renames it.
    fn persist(&self, values: &FxHashMap<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        // Sorted keys keep the file diff-friendly
        let ordered: BTreeMap<&String, &Value> = values.iter().collect();
        let content = serde_json::to_string_pretty(&ordered)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.write_all(b"\n")?;
        file.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!(path = %self.path.display(), keys = values.len(), "Settings saved");

        Ok(())
    }
}

#[async_trait]
impl EndpointProvider for SettingsStore {
    async fn endpoint_address(&self) -> Result<String> {
        self.endpoint().ok_or_else(|| {
            Error::settings(format!(
                "No endpoint configured in {}. Set the '{ENDPOINT_KEY}' key.",
                self.path.display()
            ))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SettingsStore::open(dir.path().join("settings.json")).expect("open");

        assert_eq!(store.endpoint(), None);
        assert_eq!(store.get("color"), None);
    }

    #[test]
    fn test_set_persists_across_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("settings.json");

        let store = SettingsStore::open(&path)?;
        store.set_endpoint("ws://127.0.0.1:9000")?;
        store.set("color", "#3aa757")?;

        let reopened = SettingsStore::open(&path)?;
        assert_eq!(reopened.endpoint().as_deref(), Some("ws://127.0.0.1:9000"));
        assert_eq!(reopened.get("color"), Some(json!("#3aa757")));
        Ok(())
    }

    #[test]
    fn test_file_is_sorted_json_object() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.json");

        let store = SettingsStore::open(&path).expect("open");
        store.set("zeta", 1).expect("set");
        store.set("alpha", true).expect("set");

        let content = fs::read_to_string(&path).expect("read");
        let alpha = content.find("alpha").expect("alpha");
        let zeta = content.find("zeta").expect("zeta");
        assert!(alpha < zeta);

        let parsed: Value = serde_json::from_str(&content).expect("json");
        assert_eq!(parsed, json!({"alpha": true, "zeta": 1}));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SettingsStore::open(dir.path().join("settings.json")).expect("open");

        store.set_endpoint("ws://a").expect("set");
        assert!(store.remove(ENDPOINT_KEY).expect("remove"));
        assert!(!store.remove(ENDPOINT_KEY).expect("remove again"));
        assert_eq!(store.endpoint(), None);
    }

    #[test]
    fn test_rejects_non_object_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").expect("write");

        let err = SettingsStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Settings { .. }));
    }

    #[test]
    fn test_non_string_endpoint_is_ignored() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"endpoint": 42}"#).expect("write");

        let store = SettingsStore::open(&path).expect("open");
        assert_eq!(store.endpoint(), None);
    }

    #[tokio::test]
    async fn test_endpoint_provider() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SettingsStore::open(dir.path().join("settings.json")).expect("open");

        let err = store.endpoint_address().await.unwrap_err();
        assert!(err.to_string().contains("No endpoint configured"));

        store.set_endpoint("ws://127.0.0.1:1").expect("set");
        assert_eq!(
            store.endpoint_address().await.expect("endpoint"),
            "ws://127.0.0.1:1"
        );

        let fixed = StaticEndpoint::new("ws://fixed");
        assert_eq!(fixed.endpoint_address().await.expect("endpoint"), "ws://fixed");
    }
}
