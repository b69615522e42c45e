// Editable surface abstraction
//
// The host (browser binding, accessibility bridge, in-memory buffer) exposes
// the focused element through this trait. Offsets are char offsets.
// Operations a surface cannot perform keep the default `Unsupported` error.

use crate::field::ElementInfo;

/// Events dispatched after a direct text-field replacement so page scripts
/// and frameworks observe the new value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticEvent {
    /// `input` event with the given `inputType`
    Input { input_type: &'static str },
    Change,
    KeyUp,
}

/// `inputType` signalling a programmatic replacement
pub const INSERT_REPLACEMENT_TEXT: &str = "insertReplacementText";

/// Selection range of a plain text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSelection {
    pub start: usize,
    pub end: usize,
}

impl TextSelection {
    pub fn collapsed(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Caret inside a rich-text surface: the text node holding it and the
/// caret's offset within that node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCaret {
    pub text: String,
    pub offset: usize,
}

/// Errors from surface operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The surface does not implement this operation
    #[error("Operation not supported by this surface")]
    Unsupported,
    /// Content around the caret no longer matches what was scanned
    #[error("Selection no longer matches the expected text")]
    StaleSelection,
    /// The element or text node left the document
    #[error("Element is no longer attached")]
    Detached,
    /// The host refused the mutation
    #[error("Surface rejected the operation: {0}")]
    Rejected(String),
}

/// The focused editable element, as seen by the expansion engine
pub trait EditableSurface: Send {
    /// Snapshot used for field classification
    fn element(&self) -> &ElementInfo;

    // --- Plain text fields (input, textarea) ---

    /// Current value of the field
    fn value(&self) -> Result<String, SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    fn selection(&self) -> Result<TextSelection, SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    /// Set the value through the host's native setter, so framework-managed
    /// fields see the change
    fn set_value(&mut self, _value: &str) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    fn focus(&mut self) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    fn set_selection_range(&mut self, _start: usize, _end: usize) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    fn dispatch_event(&mut self, _event: SyntheticEvent) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    // --- Rich text (contenteditable, design-mode frames) ---

    /// Caret position, or None when the caret is not inside a text node
    fn caret(&self) -> Option<TextCaret> {
        None
    }

    /// Whether `extend_selection_backward` is available
    fn supports_selection_modify(&self) -> bool {
        false
    }

    /// Move the selection's focus one char backward, keeping the anchor
    fn extend_selection_backward(&mut self) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    /// Select `[start, end)` of the caret's text node
    fn select_caret_range(&mut self, _start: usize, _end: usize) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    fn collapse_to_end(&mut self) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    /// Replace the selection through the host's undoable insert command
    fn insert_text(&mut self, _text: &str) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    // --- Clipboard fallback ---

    /// Select the `chars` characters before the caret
    fn select_backward(&mut self, _chars: usize) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    fn delete_selection(&mut self) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }

    /// Issue a paste at the caret. `clipboard_text` is what was just written
    /// to the clipboard, for hosts that cannot read it back.
    fn paste(&mut self, _clipboard_text: &str) -> Result<(), SurfaceError> {
        Err(SurfaceError::Unsupported)
    }
}
