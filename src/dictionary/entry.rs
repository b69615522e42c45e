// Shortcut entry - the persisted unit of the dictionary, plus token validation

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Longest accepted token, in chars
pub const MAX_TOKEN_LEN: usize = 50;

/// Prefix reserved for storage bookkeeping keys (`__label__`, `__meta__`)
pub const RESERVED_PREFIX: &str = "__";

/// A shortcut and its replacement text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutEntry {
    /// Trigger typed by the user (e.g., "brb")
    pub token: String,
    /// Replacement text, may contain template placeholders
    pub replacement: String,
    /// Optional human-readable annotation
    #[serde(default)]
    pub label: Option<String>,
    /// Write time in Unix milliseconds, only used to resolve tier conflicts
    #[serde(default)]
    pub updated_at: i64,
}

/// Error types for dictionary operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DictionaryError {
    /// Token is empty or whitespace only
    #[error("Shortcut cannot be empty")]
    EmptyToken,
    /// Token exceeds MAX_TOKEN_LEN chars
    #[error("Shortcut too long ({len} characters, max {max})")]
    TokenTooLong { len: usize, max: usize },
    /// Token collides with the storage bookkeeping namespace
    #[error("Shortcut '{0}' cannot start with {RESERVED_PREFIX} (reserved prefix)")]
    ReservedPrefix(String),
}

/// Check a token before it is persisted.
pub fn validate_token(token: &str) -> Result<(), DictionaryError> {
    if token.trim().is_empty() {
        return Err(DictionaryError::EmptyToken);
    }

    let len = token.chars().count();
    if len > MAX_TOKEN_LEN {
        return Err(DictionaryError::TokenTooLong {
            len,
            max: MAX_TOKEN_LEN,
        });
    }

    if token.starts_with(RESERVED_PREFIX) {
        return Err(DictionaryError::ReservedPrefix(token.to_string()));
    }

    Ok(())
}

/// Display order for listings: labelled entries first, by case-insensitive
/// label, then unlabelled entries by token.
pub fn sort_entries(entries: &mut [ShortcutEntry]) {
    fn label_key(entry: &ShortcutEntry) -> String {
        entry
            .label
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
    }

    entries.sort_by(|a, b| {
        let (la, lb) = (label_key(a), label_key(b));
        match (la.is_empty(), lb.is_empty()) {
            (false, false) => la.cmp(&lb).then_with(|| a.token.cmp(&b.token)),
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => a.token.cmp(&b.token),
        }
    });
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod tests;
