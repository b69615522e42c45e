// Storage sync - dual-tier persistence of the shortcut dictionary
//
// The local tier is the durability guarantee: its failures surface to the
// caller. The remote tier is best effort everywhere; its failures are logged
// and the dictionary degrades to the local copy.

use serde_json::{Map, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::keys::{label_key, meta_key, record_keys, RecordKey};
use super::merge::{merge, Replica};
use super::traits::{RawSnapshot, StorageTier, TierError};
use crate::dictionary::{sort_entries, validate_token, DictionaryError, ShortcutEntry, ShortcutIndex};
use crate::events::{event_names, DictionaryChanged};

/// Buffered change notifications before slow receivers start lagging
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Switches controlling how the remote tier is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Read and mirror the remote tier at all
    pub sync_enabled: bool,
    /// After a merge, also push records the remote is missing or has stale.
    /// Off by default: only the local tier is caught up on load.
    pub push_merged_to_remote: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            sync_enabled: true,
            push_merged_to_remote: false,
        }
    }
}

/// Error types for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Token failed validation, nothing was written
    #[error("Invalid shortcut: {0}")]
    Validation(#[from] DictionaryError),
    /// The local tier rejected the write
    #[error("Failed to write local storage: {0}")]
    Local(#[source] TierError),
}

/// A key left out of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSkip {
    pub key: String,
    pub reason: String,
}

/// Outcome of `import_data`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Shortcut keys written (labels not counted)
    pub imported: usize,
    pub skipped: Vec<ImportSkip>,
}

/// Dual-tier dictionary store
pub struct StorageSync {
    local: Arc<dyn StorageTier>,
    remote: Option<Arc<dyn StorageTier>>,
    options: SyncOptions,
    changes: broadcast::Sender<DictionaryChanged>,
    /// Last stamped timestamp, keeps stamps strictly increasing per client
    last_stamp: AtomicI64,
}

impl StorageSync {
    /// Create a store backed by the local tier only
    pub fn new(local: Arc<dyn StorageTier>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            local,
            remote: None,
            options: SyncOptions::default(),
            changes,
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Add the remote tier (builder pattern)
    pub fn with_remote(mut self, remote: Arc<dyn StorageTier>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Set sync options (builder pattern)
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Receive a notification after every write to either tier
    pub fn subscribe(&self) -> broadcast::Receiver<DictionaryChanged> {
        self.changes.subscribe()
    }

    /// Report a change made outside this client (another device, another
    /// tab). Subscribers reload exactly as for local writes.
    pub fn notify_external_change(&self) {
        self.notify();
    }

    fn notify(&self) {
        // No subscribers is fine
        let receivers = self.changes.send(DictionaryChanged).unwrap_or(0);
        crate::trace!("Sent {} to {} receivers", event_names::DICTIONARY_CHANGED, receivers);
    }

    fn remote(&self) -> Option<&Arc<dyn StorageTier>> {
        if self.options.sync_enabled {
            self.remote.as_ref()
        } else {
            None
        }
    }

    /// Wall-clock milliseconds, bumped if needed so stamps never repeat
    fn next_timestamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last_stamp.load(Ordering::SeqCst);
        loop {
            let stamp = now.max(last + 1);
            match self.last_stamp.compare_exchange(last, stamp, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return stamp,
                Err(actual) => last = actual,
            }
        }
    }

    /// Load both tiers and merge them.
    ///
    /// Local read failures degrade to an empty local replica; remote read
    /// failures degrade to the local replica alone. After a merge the local
    /// tier is caught up (best effort).
    pub async fn load_all(&self) -> Replica {
        let local = match self.local.get_all().await {
            Ok(raw) => Replica::from_raw(&raw),
            Err(e) => {
                crate::warn!("Failed to read {} tier, treating as empty: {}", self.local.name(), e);
                Replica::new()
            }
        };

        let Some(remote_tier) = self.remote() else {
            return local;
        };

        let remote = match remote_tier.get_all().await {
            Ok(raw) => Replica::from_raw(&raw),
            Err(e) => {
                crate::warn!(
                    "{} tier unavailable, using {} only: {}",
                    remote_tier.name(),
                    self.local.name(),
                    e
                );
                return local;
            }
        };

        let outcome = merge(&local, &remote);
        crate::debug!(
            "Merged {} records ({} to catch up locally, {} remote is behind on)",
            outcome.merged.len(),
            outcome.local_patch.len(),
            outcome.remote_patch.len()
        );

        if !outcome.local_patch.is_empty() {
            if let Err(e) = write_patch(self.local.as_ref(), &local, &outcome.local_patch).await {
                crate::warn!("Failed to write merged records back to {} tier: {}", self.local.name(), e);
            }
        }

        if self.options.push_merged_to_remote && !outcome.remote_patch.is_empty() {
            if let Err(e) = write_patch(remote_tier.as_ref(), &remote, &outcome.remote_patch).await {
                crate::warn!("Failed to push merged records to {} tier: {}", remote_tier.name(), e);
            }
        }

        outcome.merged
    }

    /// Merged entries in listing order
    pub async fn entries(&self) -> Vec<ShortcutEntry> {
        let mut entries = self.load_all().await.entries();
        sort_entries(&mut entries);
        entries
    }

    /// Build a fresh match index from the merged dictionary
    pub async fn build_index(&self) -> ShortcutIndex {
        ShortcutIndex::from_entries(&self.load_all().await.entries())
    }

    /// Create or update a shortcut. The token is trimmed first, and
    /// `label: None` leaves an existing label alone.
    pub async fn save(
        &self,
        token: &str,
        value: &str,
        label: Option<&str>,
    ) -> Result<ShortcutEntry, StorageError> {
        let token = token.trim();
        validate_token(token)?;

        let updated_at = self.next_timestamp();
        let mut updates = RawSnapshot::new();
        updates.insert(token.to_string(), Value::String(value.to_string()));
        if let Some(label) = label {
            updates.insert(label_key(token), Value::String(label.to_string()));
        }
        updates.insert(meta_key(token), Value::from(updated_at));

        self.write_both(updates).await?;
        self.notify();

        crate::info!("Saved shortcut '{}'", token);
        Ok(ShortcutEntry {
            token: token.to_string(),
            replacement: value.to_string(),
            label: label.map(str::to_string),
            updated_at,
        })
    }

    /// Delete a shortcut's value, label and timestamp from both tiers.
    pub async fn remove(&self, token: &str) -> Result<(), StorageError> {
        let keys = record_keys(token);

        self.local.remove(&keys).await.map_err(StorageError::Local)?;
        if let Some(remote) = self.remote() {
            if let Err(e) = remote.remove(&keys).await {
                crate::warn!("Failed to remove '{}' from {} tier: {}", token, remote.name(), e);
            }
        }
        self.notify();

        crate::info!("Removed shortcut '{}'", token);
        Ok(())
    }

    /// Bulk import in the export format. Every shortcut gets the same fresh
    /// timestamp; `__label__` keys pass through verbatim and `__meta__` keys
    /// are ignored.
    pub async fn import_data(&self, bulk: &Map<String, Value>) -> Result<ImportReport, StorageError> {
        let updated_at = self.next_timestamp();
        let mut report = ImportReport::default();
        let mut updates = RawSnapshot::new();
        let mut labels = Vec::new();

        for (key, value) in bulk {
            match RecordKey::parse(key) {
                RecordKey::Meta(_) => continue,
                RecordKey::Label(token) => labels.push((token, key, value)),
                RecordKey::Value(token) => {
                    if let Err(e) = validate_token(token) {
                        report.skipped.push(ImportSkip {
                            key: key.clone(),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    if !value.is_string() {
                        report.skipped.push(ImportSkip {
                            key: key.clone(),
                            reason: "replacement is not text".to_string(),
                        });
                        continue;
                    }
                    updates.insert(key.clone(), value.clone());
                    updates.insert(meta_key(token), Value::from(updated_at));
                    report.imported += 1;
                }
            }
        }

        // A label is only written next to a shortcut that exists after the
        // import; anything else could never be read back
        if !labels.is_empty() {
            let existing = self.load_all().await;
            for (token, key, value) in labels {
                let reason = if !value.is_string() {
                    "label is not text"
                } else if updates.contains_key(token) || existing.get(token).is_some() {
                    updates.insert(key.clone(), value.clone());
                    continue;
                } else {
                    "no shortcut for this label"
                };
                report.skipped.push(ImportSkip {
                    key: key.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        if updates.is_empty() {
            return Ok(report);
        }

        self.write_both(updates).await?;
        self.notify();

        crate::info!(
            "Imported {} shortcuts ({} skipped)",
            report.imported,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Every non-`__meta__` key of the merged dictionary
    pub async fn export_data(&self) -> Map<String, Value> {
        self.load_all()
            .await
            .to_raw()
            .into_iter()
            .filter(|(key, _)| !matches!(RecordKey::parse(key), RecordKey::Meta(_)))
            .collect()
    }

    /// Delete everything from both tiers.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.local.clear().await.map_err(StorageError::Local)?;
        if let Some(remote) = self.remote() {
            if let Err(e) = remote.clear().await {
                crate::warn!("Failed to clear {} tier: {}", remote.name(), e);
            }
        }
        self.notify();
        Ok(())
    }

    async fn write_both(&self, updates: RawSnapshot) -> Result<(), StorageError> {
        self.local
            .set(updates.clone())
            .await
            .map_err(StorageError::Local)?;

        if let Some(remote) = self.remote() {
            if let Err(e) = remote.set(updates).await {
                crate::warn!("Failed to mirror write to {} tier (kept locally): {}", remote.name(), e);
            }
        }
        Ok(())
    }
}

/// Bring `tier` (currently holding `current`) up to date with `patch`.
async fn write_patch(tier: &dyn StorageTier, current: &Replica, patch: &Replica) -> Result<(), TierError> {
    tier.set(patch.to_raw()).await?;

    let stale = current.stale_labels(patch);
    if !stale.is_empty() {
        tier.remove(&stale).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
