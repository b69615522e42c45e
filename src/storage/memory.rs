// In-memory storage tier
//
// Used by tests and by hosts that keep the remote replica elsewhere. The
// availability switch simulates an offline or disabled tier.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::traits::{RawSnapshot, StorageTier, TierError};

pub struct MemoryTier {
    name: String,
    data: Mutex<RawSnapshot>,
    available: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryTier {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_data(name, RawSnapshot::new())
    }

    pub fn with_data(name: impl Into<String>, data: RawSnapshot) -> Self {
        Self {
            name: name.into(),
            data: Mutex::new(data),
            available: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
        }
    }

    /// Toggle availability; every operation fails while unavailable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> RawSnapshot {
        self.data.lock().clone()
    }

    /// Number of successful mutating calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), TierError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TierError::Unavailable(self.name.clone()))
        }
    }
}

#[async_trait]
impl StorageTier for MemoryTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_all(&self) -> Result<RawSnapshot, TierError> {
        self.check_available()?;
        Ok(self.snapshot())
    }

    async fn set(&self, updates: RawSnapshot) -> Result<(), TierError> {
        self.check_available()?;
        self.data.lock().extend(updates);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), TierError> {
        self.check_available()?;
        let mut data = self.data.lock();
        for key in keys {
            data.remove(key);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), TierError> {
        self.check_available()?;
        self.data.lock().clear();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
