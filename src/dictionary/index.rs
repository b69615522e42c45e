// Shortcut index - in-memory projection of the dictionary used for matching
//
// Rebuilt wholesale from a merged snapshot on every change; never patched.

use std::collections::HashMap;

use super::ShortcutEntry;

/// A successful suffix match against the text before the caret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutMatch<'a> {
    pub token: &'a str,
    pub replacement: &'a str,
}

/// Token → replacement lookup plus tokens ordered longest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortcutIndex {
    mapping: HashMap<String, String>,
    /// Descending char length; equal lengths in ascending lexicographic order
    ordered_tokens: Vec<String>,
}

impl ShortcutIndex {
    /// Create an empty index (matches nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from token/replacement pairs. Empty tokens are dropped since they
    /// would match every keystroke.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mapping: HashMap<String, String> = pairs
            .into_iter()
            .filter(|(token, _)| !token.is_empty())
            .collect();

        let mut ordered_tokens: Vec<String> = mapping.keys().cloned().collect();
        ordered_tokens.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        Self {
            mapping,
            ordered_tokens,
        }
    }

    /// Build from stored entries
    pub fn from_entries(entries: &[ShortcutEntry]) -> Self {
        Self::from_pairs(
            entries
                .iter()
                .map(|e| (e.token.clone(), e.replacement.clone())),
        )
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Replacement text for an exact token
    pub fn get(&self, token: &str) -> Option<&str> {
        self.mapping.get(token).map(String::as_str)
    }

    /// Tokens in scan order
    pub fn ordered_tokens(&self) -> &[String] {
        &self.ordered_tokens
    }

    /// Longest token that is a suffix of `text_before_cursor` and sits on a
    /// word boundary. A candidate failing the boundary check does not stop the
    /// scan; shorter tokens are still tried.
    pub fn find_match(&self, text_before_cursor: &str) -> Option<ShortcutMatch<'_>> {
        self.ordered_tokens
            .iter()
            .filter(|token| text_before_cursor.ends_with(token.as_str()))
            .find(|token| is_word_boundary(text_before_cursor, token))
            .and_then(|token| {
                self.mapping.get(token).map(|replacement| ShortcutMatch {
                    token: token.as_str(),
                    replacement: replacement.as_str(),
                })
            })
    }
}

/// True when the char before the trailing `token` is absent or is not
/// `[A-Za-z0-9_]`. Only that one char is inspected.
pub fn is_word_boundary(text: &str, token: &str) -> bool {
    let Some(before) = text.strip_suffix(token) else {
        return false;
    };

    match before.chars().next_back() {
        None => true,
        Some(c) => !(c.is_ascii_alphanumeric() || c == '_'),
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod tests;
