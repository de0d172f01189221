//! Outbound command definitions.
//!
//! Commands are tagged by the `cmd` field. The only command the client
//! issues is `store`.
//!
//! # Format
//!
//! ```json
//! {"cmd": "store", "url": "https://example.com", "title": "Example", "tags": ["a", "b"]}
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Command
// ============================================================================

/// All outbound protocol commands.
///
/// Serialized as one JSON object per WebSocket text message. The transport's
/// own framing is the only framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    /// Store an item in the remote service.
    #[serde(rename = "store")]
    Store(CaptureCommand),
}

impl Command {
    /// Returns the wire name of the command.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Store(_) => "store",
        }
    }

    /// Encodes the command as the text payload of a single message.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if serialization fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a command from a message payload.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the payload is not a known command.
    pub fn decode(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl From<CaptureCommand> for Command {
    #[inline]
    fn from(command: CaptureCommand) -> Self {
        Self::Store(command)
    }
}

// ============================================================================
// CaptureCommand
// ============================================================================

/// A "store this item" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCommand {
    /// Source URL of the captured item.
    #[serde(rename = "url")]
    pub reference: String,

    /// Title of the captured item.
    #[serde(rename = "title")]
    pub label: String,

    /// Tags in the order the user typed them.
    pub tags: Vec<String>,
}

impl CaptureCommand {
    /// Creates a capture command, parsing tags from raw user input.
    ///
    /// See [`parse_tags`] for the tag rules.
    #[must_use]
    pub fn new(reference: impl Into<String>, label: impl Into<String>, raw_tags: &str) -> Self {
        Self {
            reference: reference.into(),
            label: label.into(),
            tags: parse_tags(raw_tags),
        }
    }
}

// ============================================================================
// Tag Parsing
// ============================================================================

/// Splits free-form tag input into tags.
///
/// Tokens are split on whitespace, stripped of leading and trailing commas,
/// and dropped if nothing is left. Order is kept and duplicates survive.
///
/// # Example
///
/// ```
/// use dfs_capture::protocol::parse_tags;
///
/// assert_eq!(parse_tags("work, urgent  todo,"), ["work", "urgent", "todo"]);
/// ```
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(|token| token.trim_matches(','))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
