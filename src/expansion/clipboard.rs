// Clipboard-mediated replacement
//
// Last resort when the surface cannot be edited directly: capture the
// clipboard, delete the token, write the replacement, paste, then restore
// the captured text. The restore is owned by a `ClipboardLease` so it
// happens on every path, including when the pipeline future is dropped.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::surface::{EditableSurface, SurfaceError};

/// Delay before the captured clipboard text is put back, giving the paste
/// time to land
pub const DEFAULT_CLIPBOARD_RESTORE_DELAY: Duration = Duration::from_millis(100);

/// Error types for clipboard access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard, or no text on it
    #[error("Clipboard unavailable")]
    Unavailable,
    #[error("Clipboard access denied")]
    PermissionDenied,
    #[error("Clipboard error: {0}")]
    Backend(String),
}

/// Async request/response boundary to whatever owns the system clipboard
#[async_trait]
pub trait ClipboardDelegate: Send + Sync {
    /// Current clipboard text
    async fn capture_text(&self) -> Result<String, ClipboardError>;

    /// Replace the clipboard contents with `text`
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Process-local clipboard
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard already holding `text`
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Mutex::new(Some(text.to_string())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.text.lock().clone()
    }
}

#[async_trait]
impl ClipboardDelegate for MemoryClipboard {
    async fn capture_text(&self) -> Result<String, ClipboardError> {
        self.text.lock().clone().ok_or(ClipboardError::Unavailable)
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.text.lock() = Some(text.to_string());
        Ok(())
    }
}

/// The operating system clipboard, through arboard
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    /// Open the system clipboard
    ///
    /// Fails on headless systems with no clipboard service.
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard = arboard::Clipboard::new().map_err(map_arboard_error)?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

fn map_arboard_error(e: arboard::Error) -> ClipboardError {
    match e {
        arboard::Error::ContentNotAvailable | arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable
        }
        other => ClipboardError::Backend(other.to_string()),
    }
}

#[async_trait]
impl ClipboardDelegate for SystemClipboard {
    async fn capture_text(&self) -> Result<String, ClipboardError> {
        self.inner.lock().get_text().map_err(map_arboard_error)
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.inner.lock().set_text(text).map_err(map_arboard_error)
    }
}

/// Captured clipboard text that must be put back.
///
/// `release` restores after the delay. Dropping an unreleased lease schedules
/// the restore on the Tokio runtime instead.
pub struct ClipboardLease {
    clipboard: Arc<dyn ClipboardDelegate>,
    saved: Option<String>,
    restore_delay: Duration,
}

impl ClipboardLease {
    /// Capture the current clipboard text.
    ///
    /// An empty or unavailable clipboard yields a lease with nothing to
    /// restore. Any other capture error is returned, since the contents
    /// could not be put back afterwards.
    pub async fn acquire(
        clipboard: Arc<dyn ClipboardDelegate>,
        restore_delay: Duration,
    ) -> Result<Self, ClipboardError> {
        let saved = match clipboard.capture_text().await {
            Ok(text) => Some(text),
            Err(ClipboardError::Unavailable) => {
                crate::debug!("Clipboard holds no text, nothing to restore");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            clipboard,
            saved,
            restore_delay,
        })
    }

    /// Text that will be restored, if the capture succeeded
    pub fn captured(&self) -> Option<&str> {
        self.saved.as_deref()
    }

    /// Wait for the restore delay, then put the captured text back
    pub async fn release(mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        tokio::time::sleep(self.restore_delay).await;
        if let Err(e) = self.clipboard.write_text(&saved).await {
            crate::warn!("Failed to restore clipboard: {}", e);
        }
    }
}

impl Drop for ClipboardLease {
    fn drop(&mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let clipboard = self.clipboard.clone();
                let delay = self.restore_delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(e) = clipboard.write_text(&saved).await {
                        crate::warn!("Failed to restore clipboard: {}", e);
                    }
                });
            }
            Err(_) => {
                crate::warn!("No runtime to restore clipboard on, captured text lost");
            }
        }
    }
}

/// Why the clipboard path could not insert the replacement
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackError {
    #[error("{0}")]
    Clipboard(#[from] ClipboardError),
    #[error("Paste failed: {0}")]
    Paste(#[from] SurfaceError),
}

/// Clipboard-mediated replacement pipeline
#[derive(Clone)]
pub struct ClipboardFallback {
    clipboard: Arc<dyn ClipboardDelegate>,
    restore_delay: Duration,
}

impl ClipboardFallback {
    pub fn new(clipboard: Arc<dyn ClipboardDelegate>) -> Self {
        Self {
            clipboard,
            restore_delay: DEFAULT_CLIPBOARD_RESTORE_DELAY,
        }
    }

    /// Set the restore delay (builder pattern)
    pub fn with_restore_delay(mut self, delay: Duration) -> Self {
        self.restore_delay = delay;
        self
    }

    pub fn restore_delay(&self) -> Duration {
        self.restore_delay
    }

    /// Replace the `token_chars` characters before the caret with `resolved`
    /// by pasting it.
    ///
    /// If the token cannot be selected it stays in place and the paste lands
    /// after it. A clipboard that cannot be captured is never written;
    /// otherwise it is restored whatever the outcome.
    pub async fn run(
        &self,
        surface: &mut dyn EditableSurface,
        token_chars: usize,
        resolved: &str,
    ) -> Result<(), FallbackError> {
        let lease = ClipboardLease::acquire(self.clipboard.clone(), self.restore_delay).await?;

        let deleted = surface
            .select_backward(token_chars)
            .and_then(|_| surface.delete_selection());
        if let Err(e) = deleted {
            crate::debug!("Could not remove token before paste, leaving it: {}", e);
        }

        let result = match self.clipboard.write_text(resolved).await {
            Ok(()) => surface.paste(resolved).map_err(FallbackError::from),
            Err(e) => Err(FallbackError::from(e)),
        };

        lease.release().await;
        result
    }
}

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod tests;
