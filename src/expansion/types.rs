// Expansion types shared by the engine and the replacement strategy

use crate::field::FieldClassification;

/// Everything one replacement attempt needs.
///
/// Offsets are char offsets in the field value (text fields) or in the
/// caret's text node (rich text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementContext {
    pub classification: FieldClassification,
    /// Token as typed
    pub token: String,
    /// Replacement with placeholders already substituted
    pub resolved: String,
    /// Caret when the match was found (just after the token)
    pub caret_before: usize,
    /// Caret once the replacement is in place
    pub caret_after: usize,
}

impl ReplacementContext {
    pub fn new(
        classification: FieldClassification,
        token: impl Into<String>,
        resolved: impl Into<String>,
        caret_before: usize,
    ) -> Self {
        let token = token.into();
        let resolved = resolved.into();
        let token_start = caret_before.saturating_sub(token.chars().count());
        let caret_after = token_start + resolved.chars().count();
        Self {
            classification,
            token,
            resolved,
            caret_before,
            caret_after,
        }
    }

    /// Length of the token in chars
    pub fn token_chars(&self) -> usize {
        self.token.chars().count()
    }
}

/// What `ExpansionEngine::handle_input` did with one input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionOutcome {
    /// Another replacement is still in flight or settling
    Ignored,
    /// The field must not be expanded in
    Skipped(FieldClassification),
    /// No text context at the caret
    NoContext,
    NoMatch,
    /// Replaced directly on the surface
    Expanded(ReplacementContext),
    /// Replaced through the clipboard
    FallbackUsed(ReplacementContext),
    /// A token matched but neither strategy could replace it
    Failed,
}

impl ExpansionOutcome {
    /// Whether the surface now holds the replacement
    pub fn is_expanded(&self) -> bool {
        matches!(
            self,
            ExpansionOutcome::Expanded(_) | ExpansionOutcome::FallbackUsed(_)
        )
    }
}

/// Engine state, observable for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    /// Classifying the field and scanning for a token
    Matching,
    /// Mutating the surface
    Expanding,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Idle => "idle",
            EngineState::Matching => "matching",
            EngineState::Expanding => "expanding",
        };
        write!(f, "{}", s)
    }
}
