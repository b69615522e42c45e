// Expansion module - detects typed shortcut tokens and replaces them
//
// The engine classifies the focused surface, scans the text before the caret
// against the shared shortcut index and hands a match to the replacement
// strategy (direct edit first, clipboard paste as a fallback).

pub mod buffer;
pub mod clipboard;
mod engine;
pub mod strategy;
pub mod surface;
mod types;

pub use buffer::TextBuffer;
pub use clipboard::{
    ClipboardDelegate, ClipboardError, ClipboardFallback, ClipboardLease, FallbackError,
    MemoryClipboard, SystemClipboard, DEFAULT_CLIPBOARD_RESTORE_DELAY,
};
pub use engine::{ExpansionEngine, ReplacementGuard, DEFAULT_RECOVERY_DELAY};
pub use strategy::{protect_trailing_spaces, ReplacementResult, ReplacementStrategy};
pub use surface::{EditableSurface, SurfaceError, SyntheticEvent, TextCaret, TextSelection};
pub use types::{EngineState, ExpansionOutcome, ReplacementContext};
