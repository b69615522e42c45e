//! Storage tier trait.
//!
//! A tier is one replica of the flat key space (local, remote). The sync
//! layer only talks to tiers through this trait, so the conflict resolution
//! in `merge` stays independent of how a tier reaches its data.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw contents of a tier: flat key → JSON value
pub type RawSnapshot = BTreeMap<String, Value>;

/// Error types for tier operations
#[derive(Debug, thiserror::Error)]
pub enum TierError {
    /// Tier is offline, disabled, or over quota
    #[error("Storage tier '{0}' is unavailable")]
    Unavailable(String),
    /// Underlying I/O failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot could not be (de)serialized
    #[error("Storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Tier contents are not a flat JSON object
    #[error("Storage tier contents are corrupt: {0}")]
    Corrupt(String),
}

/// Backend trait for one storage tier.
#[async_trait]
pub trait StorageTier: Send + Sync {
    /// Short name for logs ("local", "remote")
    fn name(&self) -> &str;

    /// Read every key in the tier.
    async fn get_all(&self) -> Result<RawSnapshot, TierError>;

    /// Write the given keys, leaving other keys untouched.
    async fn set(&self, updates: RawSnapshot) -> Result<(), TierError>;

    /// Delete the given keys. Missing keys are not an error.
    async fn remove(&self, keys: &[String]) -> Result<(), TierError>;

    /// Delete everything.
    async fn clear(&self) -> Result<(), TierError>;
}
