//! Extracted document text.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum number of characters of document text embedded in a prompt.
///
/// Keeps prompts under model input limits.
pub const MAX_PROMPT_CHARS: usize = 6000;

/// The full extracted text of one PDF.
///
/// Immutable and cheap to clone, so concurrent rule evaluations can share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DocumentText(Arc<str>);

impl DocumentText {
    /// Wrap extracted text. Empty text is allowed.
    pub fn new(text: impl Into<String>) -> Self {
        Self(Arc::from(text.into()))
    }

    /// The complete text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether extraction produced no text at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The slice that is embedded in prompts: the first
    /// [`MAX_PROMPT_CHARS`] characters.
    pub fn prompt_slice(&self) -> &str {
        truncate_chars(&self.0, MAX_PROMPT_CHARS)
    }

    /// Whether [`prompt_slice`](Self::prompt_slice) drops any text.
    pub fn is_truncated(&self) -> bool {
        self.prompt_slice().len() < self.0.len()
    }
}

impl Default for DocumentText {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl From<String> for DocumentText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for DocumentText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<DocumentText> for String {
    fn from(text: DocumentText) -> Self {
        text.0.to_string()
    }
}

/// Return the prefix of `text` holding at most `max_chars` characters.
///
/// Never splits a multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
