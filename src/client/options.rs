//! Client connection options.
//!
//! # Example
//!
//! ```
//! use dfs_capture::ClientOptions;
//!
//! let options = ClientOptions::new().with_sub_protocol("dfs.v2");
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::transport::DEFAULT_SUB_PROTOCOL;

// ============================================================================
// Constants
// ============================================================================

/// RFC 7230 token, the grammar of a WebSocket sub-protocol name.
static SUB_PROTOCOL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[!#$%&'*+.^_`|~0-9A-Za-z-]+$").expect("sub-protocol pattern is valid")
});

// ============================================================================
// ClientOptions
// ============================================================================

/// Options applied to every connection a client opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Sub-protocol offered in the handshake.
    pub sub_protocol: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientOptions {
    /// Creates options with the default `dfs` sub-protocol.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            sub_protocol: DEFAULT_SUB_PROTOCOL.to_string(),
        }
    }

    /// Sets the sub-protocol offered in the handshake.
    #[inline]
    #[must_use]
    pub fn with_sub_protocol(mut self, sub_protocol: impl Into<String>) -> Self {
        self.sub_protocol = sub_protocol.into();
        self
    }

    /// Checks that the options can be used for a handshake.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the sub-protocol is empty or not a token.
    pub fn validate(&self) -> Result<()> {
        if self.sub_protocol.is_empty() {
            return Err(Error::config("Sub-protocol must not be empty"));
        }

        if !SUB_PROTOCOL_TOKEN.is_match(&self.sub_protocol) {
            return Err(Error::config(format!(
                "Sub-protocol '{}' is not a valid token",
                self.sub_protocol
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sub_protocol() {
        let options = ClientOptions::default();
        assert_eq!(options.sub_protocol, "dfs");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_custom_sub_protocol() {
        let options = ClientOptions::new().with_sub_protocol("dfs-v2.json");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_sub_protocol() {
        let err = ClientOptions::new().with_sub_protocol("").validate().unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_rejects_separators() {
        for bad in ["dfs v2", "dfs,chat", "a/b", "ümlaut"] {
            assert!(
                ClientOptions::new().with_sub_protocol(bad).validate().is_err(),
                "{bad} should be rejected"
            );
        }
    }
}
