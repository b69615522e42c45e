// Expansion engine - turns input events into token replacements
//
// Idle → Matching → Expanding → Idle. Matching and direct replacement run
// synchronously within one call; only the clipboard fallback awaits. The
// exclusivity flag belongs to the engine instance and stays set until the
// recovery delay after each expansion has elapsed.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::strategy::{ReplacementResult, ReplacementStrategy};
use super::surface::EditableSurface;
use super::types::{EngineState, ExpansionOutcome, ReplacementContext};
use crate::events::{
    current_timestamp, ExpansionAppliedPayload, ExpansionEventEmitter, ExpansionFailedPayload,
};
use crate::field::{classify, FieldClassification};
use crate::storage::SharedIndex;
use crate::template;
use crate::util::run_after;
use crate::util::text::{char_len, prefix_chars};

/// Settle time after an expansion before the next one may start
pub const DEFAULT_RECOVERY_DELAY: Duration = Duration::from_millis(150);

/// Holds the exclusivity flag for one expansion.
///
/// Dropping the guard (on success, error or unwind) schedules the flag's
/// release after the recovery delay.
pub struct ReplacementGuard {
    flag: Arc<AtomicBool>,
    recovery_delay: Duration,
}

impl ReplacementGuard {
    /// Take the flag, or None if another expansion holds it
    pub fn acquire(flag: &Arc<AtomicBool>, recovery_delay: Duration) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(Self {
            flag: flag.clone(),
            recovery_delay,
        })
    }
}

impl Drop for ReplacementGuard {
    fn drop(&mut self) {
        let flag = self.flag.clone();
        run_after(self.recovery_delay, move || {
            flag.store(false, Ordering::SeqCst);
        });
    }
}

/// Claims the engine state for one `handle_input` call.
///
/// Only a call that found the engine idle owns the state; dropping the
/// owning guard (including on unwind) puts it back to idle.
struct StateGuard<'a> {
    state: &'a Mutex<EngineState>,
    owned: bool,
}

impl<'a> StateGuard<'a> {
    fn enter(state: &'a Mutex<EngineState>) -> Self {
        let mut current = state.lock();
        let owned = *current == EngineState::Idle;
        if owned {
            *current = EngineState::Matching;
        }
        Self { state, owned }
    }

    fn set(&self, next: EngineState) {
        if self.owned {
            *self.state.lock() = next;
        }
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if self.owned {
            *self.state.lock() = EngineState::Idle;
        }
    }
}

/// Watches input events on editable surfaces and expands shortcut tokens
pub struct ExpansionEngine {
    index: SharedIndex,
    strategy: ReplacementStrategy,
    replacing: Arc<AtomicBool>,
    state: Mutex<EngineState>,
    recovery_delay: Duration,
    emitter: Option<Arc<dyn ExpansionEventEmitter>>,
}

impl ExpansionEngine {
    /// Engine over a shared index, direct replacement only
    pub fn new(index: SharedIndex) -> Self {
        Self {
            index,
            strategy: ReplacementStrategy::new(),
            replacing: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(EngineState::Idle),
            recovery_delay: DEFAULT_RECOVERY_DELAY,
            emitter: None,
        }
    }

    /// Set the replacement strategy (builder pattern)
    pub fn with_strategy(mut self, strategy: ReplacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the recovery delay (builder pattern)
    pub fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Report applied and failed expansions to `emitter` (builder pattern)
    pub fn with_emitter(mut self, emitter: Arc<dyn ExpansionEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Whether an expansion is in flight or still settling
    pub fn is_replacing(&self) -> bool {
        self.replacing.load(Ordering::SeqCst)
    }

    /// Handle one input event on `surface`. At most one token is expanded.
    pub async fn handle_input(&self, surface: &mut dyn EditableSurface) -> ExpansionOutcome {
        if self.is_replacing() {
            crate::trace!("Expansion in progress, ignoring input");
            return ExpansionOutcome::Ignored;
        }

        let state = StateGuard::enter(&self.state);
        self.match_and_expand(surface, &state).await
    }

    async fn match_and_expand(
        &self,
        surface: &mut dyn EditableSurface,
        state: &StateGuard<'_>,
    ) -> ExpansionOutcome {
        let classification = classify(surface.element());
        if !classification.allows_expansion() {
            return ExpansionOutcome::Skipped(classification);
        }

        let Some(before_cursor) = text_before_cursor(surface, classification) else {
            return ExpansionOutcome::NoContext;
        };

        let found = {
            let index = self.index.read();
            index
                .find_match(&before_cursor)
                .map(|m| (m.token.to_string(), m.replacement.to_string()))
        };
        let Some((token, replacement)) = found else {
            return ExpansionOutcome::NoMatch;
        };

        let Some(_guard) = ReplacementGuard::acquire(&self.replacing, self.recovery_delay) else {
            return ExpansionOutcome::Ignored;
        };
        state.set(EngineState::Expanding);

        let ctx = ReplacementContext::new(
            classification,
            token,
            template::resolve_now(&replacement),
            char_len(&before_cursor),
        );
        crate::debug!("Expanding '{}' in {} field", ctx.token, classification);

        match self.strategy.replace(surface, &ctx).await {
            ReplacementResult::Direct => {
                self.emit_applied(&ctx, false);
                ExpansionOutcome::Expanded(ctx)
            }
            ReplacementResult::Fallback => {
                self.emit_applied(&ctx, true);
                ExpansionOutcome::FallbackUsed(ctx)
            }
            ReplacementResult::Failed(reason) => {
                crate::debug!("Expansion of '{}' failed: {}", ctx.token, reason);
                self.emit_failed(&ctx, reason);
                ExpansionOutcome::Failed
            }
        }
    }

    fn emit_applied(&self, ctx: &ReplacementContext, used_fallback: bool) {
        if let Some(emitter) = &self.emitter {
            emitter.emit_expansion_applied(ExpansionAppliedPayload {
                token: ctx.token.clone(),
                classification: ctx.classification,
                used_fallback,
                timestamp: current_timestamp(),
            });
        }
    }

    fn emit_failed(&self, ctx: &ReplacementContext, reason: String) {
        if let Some(emitter) = &self.emitter {
            emitter.emit_expansion_failed(ExpansionFailedPayload {
                token: ctx.token.clone(),
                classification: ctx.classification,
                reason,
                timestamp: current_timestamp(),
            });
        }
    }
}

/// Text between the start of the field (or caret text node) and the caret
fn text_before_cursor(
    surface: &dyn EditableSurface,
    classification: FieldClassification,
) -> Option<String> {
    match classification {
        FieldClassification::Input | FieldClassification::Textarea => {
            let value = surface.value().ok()?;
            let selection = surface.selection().ok()?;
            Some(prefix_chars(&value, selection.start).to_string())
        }
        FieldClassification::ContentEditable => {
            let caret = surface.caret()?;
            Some(prefix_chars(&caret.text, caret.offset).to_string())
        }
        FieldClassification::Password
        | FieldClassification::ReadOnly
        | FieldClassification::Unknown => None,
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
