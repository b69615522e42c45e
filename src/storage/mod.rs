//! Dictionary persistence across two storage tiers.
//!
//! The local tier is authoritative for durability; the optional remote tier
//! is mirrored best effort. Reads merge both tiers per key, newest write wins.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::storage::{DictionaryWatcher, JsonFileTier, StorageSync};
//!
//! let local = Arc::new(JsonFileTier::new("local", path));
//! let sync = Arc::new(StorageSync::new(local));
//! sync.save("brb", "be right back", Some("away")).await?;
//!
//! let index = storage::shared_index();
//! let watcher = DictionaryWatcher::spawn(sync.clone(), index.clone());
//! ```

pub mod file;
pub mod keys;
pub mod memory;
pub mod merge;
pub mod sync;
pub mod traits;
mod watcher;

pub use file::JsonFileTier;
pub use keys::{label_key, meta_key, RecordKey, LABEL_PREFIX, META_PREFIX};
pub use memory::MemoryTier;
pub use merge::{merge, MergeOutcome, Replica, StoredRecord};
pub use sync::{ImportReport, ImportSkip, StorageError, StorageSync, SyncOptions};
pub use traits::{RawSnapshot, StorageTier, TierError};
pub use watcher::{refresh_index, shared_index, DictionaryWatcher, SharedIndex};
