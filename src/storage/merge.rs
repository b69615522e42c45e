// Two-replica last-writer-wins merge
//
// Pure functions only: tiers are read into typed replicas, merged here, and the
// resulting patches are written back by the sync layer.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::keys::{label_key, meta_key, RecordKey};
use super::traits::RawSnapshot;
use crate::dictionary::ShortcutEntry;

/// One logical record as stored in a tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub value: String,
    pub label: Option<String>,
    /// Write timestamp, 0 when the tier has no `__meta__` key for it
    pub updated_at: i64,
}

/// Typed view of one tier's flat key space
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replica {
    records: BTreeMap<String, StoredRecord>,
}

impl Replica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw snapshot. Non-string values under shortcut keys are
    /// skipped; labels and timestamps without a value key are dropped.
    pub fn from_raw(raw: &RawSnapshot) -> Self {
        let mut records = BTreeMap::new();

        for (key, value) in raw {
            let RecordKey::Value(token) = RecordKey::parse(key) else {
                continue;
            };
            let Some(text) = value.as_str() else {
                crate::warn!("Skipping non-text value stored under '{}'", token);
                continue;
            };

            let label = raw
                .get(&label_key(token))
                .and_then(Value::as_str)
                .map(str::to_string);
            let updated_at = raw.get(&meta_key(token)).map(timestamp_of).unwrap_or(0);

            records.insert(
                token.to_string(),
                StoredRecord {
                    value: text.to_string(),
                    label,
                    updated_at,
                },
            );
        }

        Self { records }
    }

    /// Encode back into the flat key space.
    pub fn to_raw(&self) -> RawSnapshot {
        let mut raw = RawSnapshot::new();
        for (token, record) in &self.records {
            raw.insert(token.clone(), Value::String(record.value.clone()));
            if let Some(label) = &record.label {
                raw.insert(label_key(token), Value::String(label.clone()));
            }
            raw.insert(meta_key(token), Value::from(record.updated_at));
        }
        raw
    }

    pub fn insert(&mut self, token: impl Into<String>, record: StoredRecord) {
        self.records.insert(token.into(), record);
    }

    pub fn get(&self, token: &str) -> Option<&StoredRecord> {
        self.records.get(token)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoredRecord)> {
        self.records.iter()
    }

    /// Records as dictionary entries (token order)
    pub fn entries(&self) -> Vec<ShortcutEntry> {
        self.records
            .iter()
            .map(|(token, record)| ShortcutEntry {
                token: token.clone(),
                replacement: record.value.clone(),
                label: record.label.clone(),
                updated_at: record.updated_at,
            })
            .collect()
    }

    /// Label keys present in `self` that `patch` will leave without a label.
    /// `set` can't delete keys, so these have to be removed explicitly.
    pub fn stale_labels(&self, patch: &Replica) -> Vec<String> {
        patch
            .records
            .iter()
            .filter(|(token, record)| {
                record.label.is_none()
                    && self
                        .records
                        .get(*token)
                        .is_some_and(|current| current.label.is_some())
            })
            .map(|(token, _)| label_key(token))
            .collect()
    }
}

/// Result of merging the local and remote replicas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Reconciled dictionary
    pub merged: Replica,
    /// Records local must receive to equal `merged`
    pub local_patch: Replica,
    /// Records remote must receive to equal `merged`
    pub remote_patch: Replica,
}

/// Merge two replicas key by key.
///
/// The strictly newer timestamp wins value, label and timestamp together.
/// On equal timestamps the remote copy is kept (either copy is acceptable).
pub fn merge(local: &Replica, remote: &Replica) -> MergeOutcome {
    let tokens: BTreeSet<&String> = local.records.keys().chain(remote.records.keys()).collect();
    let mut outcome = MergeOutcome::default();

    for token in tokens {
        let winner = match (local.records.get(token), remote.records.get(token)) {
            (Some(l), Some(r)) if l.updated_at > r.updated_at => l,
            (Some(_), Some(r)) => r,
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (None, None) => continue,
        };

        if local.records.get(token) != Some(winner) {
            outcome.local_patch.insert(token.clone(), winner.clone());
        }
        if remote.records.get(token) != Some(winner) {
            outcome.remote_patch.insert(token.clone(), winner.clone());
        }
        outcome.merged.insert(token.clone(), winner.clone());
    }

    outcome
}

fn timestamp_of(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
