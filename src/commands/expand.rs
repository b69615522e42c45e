// Expand command - replays text into an in-memory field one keystroke at a time

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::config::AppConfig;
use crate::events::LogEventEmitter;
use crate::expansion::{
    ClipboardDelegate, ClipboardFallback, ExpansionEngine, MemoryClipboard, ReplacementStrategy,
    SystemClipboard, TextBuffer,
};
use crate::storage::StorageSync;

/// Type `text` into an empty input, running the engine after every char,
/// and return the final field contents.
///
/// After each expansion the replay waits out the configured recovery delay
/// before typing on, so no keystroke is dropped by the engine.
pub async fn expand_text(sync: &StorageSync, config: &AppConfig, text: &str) -> String {
    let index = Arc::new(RwLock::new(sync.build_index().await));
    let recovery_delay = config.settings.recovery_delay();

    let fallback = ClipboardFallback::new(open_clipboard())
        .with_restore_delay(config.settings.clipboard_restore_delay());
    let engine = ExpansionEngine::new(index)
        .with_strategy(ReplacementStrategy::new().with_fallback(fallback))
        .with_recovery_delay(recovery_delay)
        .with_emitter(Arc::new(LogEventEmitter));

    let mut buffer = TextBuffer::input();
    for c in text.chars() {
        buffer.type_char(c);
        engine.handle_input(&mut buffer).await;
        wait_for_recovery(&engine, recovery_delay).await;
    }

    buffer.text().to_string()
}

async fn wait_for_recovery(engine: &ExpansionEngine, recovery_delay: Duration) {
    if !engine.is_replacing() {
        return;
    }
    tokio::time::sleep(recovery_delay).await;
    // The release task is due by now but may not have been polled yet
    while engine.is_replacing() {
        tokio::task::yield_now().await;
    }
}

/// The system clipboard, or a private one when there is none (headless)
fn open_clipboard() -> Arc<dyn ClipboardDelegate> {
    match SystemClipboard::new() {
        Ok(clipboard) => Arc::new(clipboard),
        Err(e) => {
            crate::debug!("System clipboard unavailable, using in-memory clipboard: {}", e);
            Arc::new(MemoryClipboard::new())
        }
    }
}

#[cfg(test)]
#[path = "expand_test.rs"]
mod tests;
