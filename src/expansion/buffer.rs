// In-memory editable surface
//
// Behaves like a single-text-node field: a plain input/textarea, or a
// contenteditable element whose caret always sits in its one text node.
// Used by the CLI and by tests.

use super::surface::{EditableSurface, SurfaceError, SyntheticEvent, TextCaret, TextSelection};
use crate::field::ElementInfo;
use crate::util::text::{char_len, prefix_chars, slice_chars, suffix_chars};

#[derive(Debug, Clone)]
pub struct TextBuffer {
    element: ElementInfo,
    value: String,
    /// Fixed end of the selection
    anchor: usize,
    /// Moving end of the selection (the caret)
    focus: usize,
    focused: bool,
    selection_modify: bool,
    events: Vec<SyntheticEvent>,
}

impl TextBuffer {
    /// Buffer for an arbitrary element snapshot
    pub fn new(element: ElementInfo) -> Self {
        Self {
            element,
            value: String::new(),
            anchor: 0,
            focus: 0,
            focused: false,
            selection_modify: true,
            events: Vec::new(),
        }
    }

    /// `<input type="text">`
    pub fn input() -> Self {
        Self::new(ElementInfo::input(Some("text")))
    }

    pub fn textarea() -> Self {
        Self::new(ElementInfo::textarea())
    }

    pub fn content_editable() -> Self {
        Self::new(ElementInfo::content_editable())
    }

    /// Start with `text` and the caret at its end (builder pattern)
    pub fn with_text(mut self, text: &str) -> Self {
        self.value = text.to_string();
        let end = char_len(text);
        self.anchor = end;
        self.focus = end;
        self
    }

    /// Disable char-wise selection extension so rich-text replacement uses
    /// explicit ranges (builder pattern)
    pub fn without_selection_modify(mut self) -> Self {
        self.selection_modify = false;
        self
    }

    pub fn text(&self) -> &str {
        &self.value
    }

    /// Caret position (the selection's moving end)
    pub fn caret_position(&self) -> usize {
        self.focus
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Events dispatched so far, oldest first
    pub fn events(&self) -> &[SyntheticEvent] {
        &self.events
    }

    /// Type one char at the caret, replacing any selection
    pub fn type_char(&mut self, c: char) {
        let mut encoded = [0u8; 4];
        self.replace_selection(c.encode_utf8(&mut encoded));
    }

    /// Type each char of `text` in turn
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.type_char(c);
        }
    }

    fn range(&self) -> (usize, usize) {
        (self.anchor.min(self.focus), self.anchor.max(self.focus))
    }

    fn replace_selection(&mut self, text: &str) {
        let (start, end) = self.range();
        let mut next = String::with_capacity(self.value.len() + text.len());
        next.push_str(prefix_chars(&self.value, start));
        next.push_str(text);
        next.push_str(suffix_chars(&self.value, end));
        self.value = next;

        let caret = start + char_len(text);
        self.anchor = caret;
        self.focus = caret;
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), SurfaceError> {
        if start > end || end > char_len(&self.value) {
            return Err(SurfaceError::Rejected(format!(
                "range {}..{} outside text of length {}",
                start,
                end,
                char_len(&self.value)
            )));
        }
        Ok(())
    }
}

impl EditableSurface for TextBuffer {
    fn element(&self) -> &ElementInfo {
        &self.element
    }

    fn value(&self) -> Result<String, SurfaceError> {
        Ok(self.value.clone())
    }

    fn selection(&self) -> Result<TextSelection, SurfaceError> {
        let (start, end) = self.range();
        Ok(TextSelection { start, end })
    }

    fn set_value(&mut self, value: &str) -> Result<(), SurfaceError> {
        self.value = value.to_string();
        // Assigning a value moves the caret to the end
        let end = char_len(value);
        self.anchor = end;
        self.focus = end;
        Ok(())
    }

    fn focus(&mut self) -> Result<(), SurfaceError> {
        self.focused = true;
        Ok(())
    }

    fn set_selection_range(&mut self, start: usize, end: usize) -> Result<(), SurfaceError> {
        self.check_range(start, end)?;
        self.anchor = start;
        self.focus = end;
        Ok(())
    }

    fn dispatch_event(&mut self, event: SyntheticEvent) -> Result<(), SurfaceError> {
        self.events.push(event);
        Ok(())
    }

    fn caret(&self) -> Option<TextCaret> {
        if !self.element.is_content_editable {
            return None;
        }
        Some(TextCaret {
            text: self.value.clone(),
            offset: self.focus,
        })
    }

    fn supports_selection_modify(&self) -> bool {
        self.selection_modify
    }

    fn extend_selection_backward(&mut self) -> Result<(), SurfaceError> {
        if !self.selection_modify {
            return Err(SurfaceError::Unsupported);
        }
        self.focus = self.focus.saturating_sub(1);
        Ok(())
    }

    fn select_caret_range(&mut self, start: usize, end: usize) -> Result<(), SurfaceError> {
        self.check_range(start, end)?;
        self.anchor = start;
        self.focus = end;
        Ok(())
    }

    fn collapse_to_end(&mut self) -> Result<(), SurfaceError> {
        let (_, end) = self.range();
        self.anchor = end;
        self.focus = end;
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.replace_selection(text);
        Ok(())
    }

    fn select_backward(&mut self, chars: usize) -> Result<(), SurfaceError> {
        // Measured from the caret end of any live selection
        let (_, end) = self.range();
        if end < chars {
            return Err(SurfaceError::StaleSelection);
        }
        self.anchor = end;
        self.focus = end - chars;
        Ok(())
    }

    fn delete_selection(&mut self) -> Result<(), SurfaceError> {
        self.replace_selection("");
        Ok(())
    }

    fn paste(&mut self, clipboard_text: &str) -> Result<(), SurfaceError> {
        self.replace_selection(clipboard_text);
        Ok(())
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (start, end) = self.range();
        write!(
            f,
            "{}|{}|{}",
            prefix_chars(&self.value, start),
            slice_chars(&self.value, start, end),
            suffix_chars(&self.value, end)
        )
    }
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod tests;
