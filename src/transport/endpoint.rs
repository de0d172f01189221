//! Endpoint address validation.
//!
//! The endpoint comes from user-edited settings, so it is parsed before a
//! session is created. Only `ws://` and `wss://` URLs with a host pass.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Accepted URL schemes.
const WEBSOCKET_SCHEMES: &[&str] = &["ws", "wss"];

// ============================================================================
// Functions
// ============================================================================

/// Parses and validates an endpoint address.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] if the address is empty, is not a URL,
/// has no host, or uses a scheme other than `ws`/`wss`.
///
/// # Example
///
/// ```
/// use dfs_capture::transport::parse_endpoint;
///
/// let url = parse_endpoint("ws://127.0.0.1:8080/dfs").unwrap();
/// assert_eq!(url.port(), Some(8080));
/// assert!(parse_endpoint("http://127.0.0.1").is_err());
/// ```
pub fn parse_endpoint(address: &str) -> Result<Url> {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return Err(Error::invalid_endpoint(address, "address is empty"));
    }

    let url = Url::parse(trimmed).map_err(|e| Error::invalid_endpoint(trimmed, e.to_string()))?;

    if !WEBSOCKET_SCHEMES.contains(&url.scheme()) {
        return Err(Error::invalid_endpoint(
            trimmed,
            format!("scheme '{}' is not ws or wss", url.scheme()),
        ));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::invalid_endpoint(trimmed, "missing host"));
    }

    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ws_and_wss() {
        let ws = parse_endpoint("ws://localhost:9000").expect("ws");
        assert_eq!(ws.scheme(), "ws");
        assert_eq!(ws.host_str(), Some("localhost"));

        let wss = parse_endpoint("  wss://dfs.example.org/socket ").expect("wss");
        assert_eq!(wss.path(), "/socket");
    }

    #[test]
    fn test_rejects_empty() {
        let err = parse_endpoint("   ").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_rejects_other_schemes() {
        let err = parse_endpoint("http://localhost:9000").unwrap_err();
        assert!(err.to_string().contains("scheme 'http'"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_endpoint("not a url").is_err());
        assert!(parse_endpoint("ws://").is_err());
    }
}
