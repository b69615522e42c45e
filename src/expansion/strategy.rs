// Replacement strategy - puts the resolved text in place of the token
//
// Direct manipulation first (synchronous, no clipboard side effects), then
// the clipboard pipeline when the direct path fails.

use std::borrow::Cow;

use super::clipboard::ClipboardFallback;
use super::surface::{EditableSurface, SurfaceError, SyntheticEvent, INSERT_REPLACEMENT_TEXT};
use super::types::ReplacementContext;
use crate::field::FieldClassification;
use crate::util::text::{char_len, prefix_chars, slice_chars, suffix_chars};

const NBSP: char = '\u{00A0}';

/// How a replacement ended up being applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementResult {
    Direct,
    Fallback,
    /// Neither path worked; carries the last error
    Failed(String),
}

/// Direct replacement with an optional clipboard fallback
#[derive(Clone, Default)]
pub struct ReplacementStrategy {
    fallback: Option<ClipboardFallback>,
}

impl ReplacementStrategy {
    /// Direct replacement only
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the clipboard fallback (builder pattern)
    pub fn with_fallback(mut self, fallback: ClipboardFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Replace the token directly on the surface.
    pub fn apply(
        surface: &mut dyn EditableSurface,
        ctx: &ReplacementContext,
    ) -> Result<(), SurfaceError> {
        match ctx.classification {
            FieldClassification::Input | FieldClassification::Textarea => {
                replace_in_text_field(surface, ctx)
            }
            FieldClassification::ContentEditable => replace_in_rich_text(surface, ctx),
            FieldClassification::Password
            | FieldClassification::ReadOnly
            | FieldClassification::Unknown => Err(SurfaceError::Unsupported),
        }
    }

    /// Replace directly, falling back to the clipboard when that fails.
    pub async fn replace(
        &self,
        surface: &mut dyn EditableSurface,
        ctx: &ReplacementContext,
    ) -> ReplacementResult {
        if !ctx.classification.allows_expansion() {
            return ReplacementResult::Failed(format!(
                "{} fields are never expanded",
                ctx.classification
            ));
        }

        let direct_error = match Self::apply(surface, ctx) {
            Ok(()) => return ReplacementResult::Direct,
            Err(e) => e,
        };
        crate::debug!(
            "Direct replacement of '{}' failed ({}), trying clipboard",
            ctx.token,
            direct_error
        );

        let Some(fallback) = &self.fallback else {
            return ReplacementResult::Failed(direct_error.to_string());
        };

        match fallback.run(surface, ctx.token_chars(), &ctx.resolved).await {
            Ok(()) => ReplacementResult::Fallback,
            Err(e) => {
                crate::debug!("Clipboard replacement of '{}' failed: {}", ctx.token, e);
                ReplacementResult::Failed(e.to_string())
            }
        }
    }
}

/// Splice the replacement into a plain field's value and park the caret
/// right after it.
fn replace_in_text_field(
    surface: &mut dyn EditableSurface,
    ctx: &ReplacementContext,
) -> Result<(), SurfaceError> {
    let value = surface.value()?;
    let selection = surface.selection()?;

    if !prefix_chars(&value, selection.start).ends_with(ctx.token.as_str()) {
        return Err(SurfaceError::StaleSelection);
    }

    let token_start = selection.start - ctx.token_chars();
    let before = prefix_chars(&value, token_start);
    let after = suffix_chars(&value, selection.end);
    let updated = format!("{}{}{}", before, ctx.resolved, after);

    surface.set_value(&updated)?;

    // The value is already replaced from here on; nothing below may
    // trigger a second insertion through the clipboard
    let caret = char_len(before) + char_len(&ctx.resolved);
    if let Err(e) = surface.focus() {
        crate::debug!("Could not refocus field after replacement: {}", e);
    }
    if let Err(e) = surface.set_selection_range(caret, caret) {
        crate::debug!("Could not place caret at {}: {}", caret, e);
    }

    for event in [
        SyntheticEvent::Input {
            input_type: INSERT_REPLACEMENT_TEXT,
        },
        SyntheticEvent::Change,
        SyntheticEvent::KeyUp,
    ] {
        if let Err(e) = surface.dispatch_event(event) {
            crate::debug!("Failed to dispatch {:?}: {}", event, e);
        }
    }
    Ok(())
}

/// Select the token in the caret's text node and insert over it.
fn replace_in_rich_text(
    surface: &mut dyn EditableSurface,
    ctx: &ReplacementContext,
) -> Result<(), SurfaceError> {
    let caret = surface.caret().ok_or(SurfaceError::Detached)?;
    let token_chars = ctx.token_chars();

    if caret.offset < token_chars {
        return Err(SurfaceError::StaleSelection);
    }
    let start = caret.offset - token_chars;
    if slice_chars(&caret.text, start, caret.offset) != ctx.token {
        return Err(SurfaceError::StaleSelection);
    }

    surface.collapse_to_end()?;
    if let Err(e) = select_and_insert(surface, ctx, start, caret.offset) {
        // Leave the caret behind the token so a fallback selects the token
        // and not the text before it
        if let Err(collapse) = surface.collapse_to_end() {
            crate::debug!("Could not restore caret after failed insert: {}", collapse);
        }
        return Err(e);
    }

    if let Err(e) = surface.collapse_to_end() {
        crate::debug!("Could not collapse caret after insert: {}", e);
    }
    Ok(())
}

fn select_and_insert(
    surface: &mut dyn EditableSurface,
    ctx: &ReplacementContext,
    start: usize,
    end: usize,
) -> Result<(), SurfaceError> {
    if surface.supports_selection_modify() {
        for _ in 0..ctx.token_chars() {
            surface.extend_selection_backward()?;
        }
    } else {
        surface.select_caret_range(start, end)?;
    }
    surface.insert_text(&protect_trailing_spaces(&ctx.resolved))
}

/// Swap trailing plain spaces for non-breaking spaces so rich-text editors
/// don't collapse them.
pub fn protect_trailing_spaces(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim_end_matches(' ');
    let trailing = text.len() - trimmed.len();
    if trailing == 0 {
        return Cow::Borrowed(text);
    }

    let mut protected = String::with_capacity(trimmed.len() + trailing * NBSP.len_utf8());
    protected.push_str(trimmed);
    protected.extend(std::iter::repeat(NBSP).take(trailing));
    Cow::Owned(protected)
}

#[cfg(test)]
#[path = "strategy_test.rs"]
mod tests;
