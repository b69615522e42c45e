// Dictionary watcher - keeps the shared match index current
//
// Every change notification triggers a full reload and re-merge of both
// tiers; the new index replaces the old one atomically.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;

use super::sync::StorageSync;
use crate::dictionary::ShortcutIndex;

/// Index shared between the watcher (writer) and the expansion engine (reader)
pub type SharedIndex = Arc<RwLock<ShortcutIndex>>;

/// Create an empty shared index
pub fn shared_index() -> SharedIndex {
    Arc::new(RwLock::new(ShortcutIndex::new()))
}

/// Rebuild the index from storage and swap it in. Returns the new token count.
pub async fn refresh_index(sync: &StorageSync, index: &SharedIndex) -> usize {
    let fresh = sync.build_index().await;
    let count = fresh.len();
    *index.write() = fresh;
    crate::debug!("Shortcut index rebuilt with {} tokens", count);
    count
}

/// Background task that reloads the index on every dictionary change
pub struct DictionaryWatcher {
    handle: Option<JoinHandle<()>>,
}

impl DictionaryWatcher {
    /// Start watching. Performs the initial load before waiting for changes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(sync: Arc<StorageSync>, index: SharedIndex) -> Self {
        // Subscribe before the initial load so no change is missed in between
        let mut changes = sync.subscribe();

        let handle = tokio::spawn(async move {
            refresh_index(&sync, &index).await;

            loop {
                match changes.recv().await {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        crate::debug!("Watcher lagged by {} notifications", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }

                // Coalesce a burst of notifications into one reload
                loop {
                    match changes.try_recv() {
                        Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Closed) => {
                            refresh_index(&sync, &index).await;
                            return;
                        }
                    }
                }

                refresh_index(&sync, &index).await;
            }
            crate::debug!("Dictionary watcher stopped: change channel closed");
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Whether the background task is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop watching
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for DictionaryWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "watcher_test.rs"]
mod tests;
