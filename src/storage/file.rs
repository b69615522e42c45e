// JSON file storage tier - persists a flat key space to one file
//
// Writes use the temp file + sync + rename pattern so a crash never leaves a
// half-written snapshot. A missing file reads as an empty tier.

use async_trait::async_trait;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::traits::{RawSnapshot, StorageTier, TierError};

pub struct JsonFileTier {
    name: String,
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileTier {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn modify<F>(&self, change: F) -> Result<(), TierError>
    where
        F: FnOnce(&mut RawSnapshot) + Send + 'static,
    {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let mut snapshot = read_snapshot(&path)?;
            change(&mut snapshot);
            write_snapshot(&path, &snapshot)
        })
        .await
        .map_err(|e| TierError::Io(std::io::Error::other(format!("Storage task panicked: {}", e))))?
    }
}

#[async_trait]
impl StorageTier for JsonFileTier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_all(&self) -> Result<RawSnapshot, TierError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_snapshot(&path))
            .await
            .map_err(|e| {
                TierError::Io(std::io::Error::other(format!("Storage task panicked: {}", e)))
            })?
    }

    async fn set(&self, updates: RawSnapshot) -> Result<(), TierError> {
        self.modify(move |snapshot| snapshot.extend(updates)).await
    }

    async fn remove(&self, keys: &[String]) -> Result<(), TierError> {
        let keys = keys.to_vec();
        self.modify(move |snapshot| {
            for key in &keys {
                snapshot.remove(key);
            }
        })
        .await
    }

    async fn clear(&self) -> Result<(), TierError> {
        self.modify(|snapshot| snapshot.clear()).await
    }
}

fn read_snapshot(path: &Path) -> Result<RawSnapshot, TierError> {
    if !path.exists() {
        crate::debug!("No store file at {:?}, starting empty", path);
        return Ok(RawSnapshot::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(RawSnapshot::new());
    }

    let value: serde_json::Value = serde_json::from_str(&content)?;
    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(TierError::Corrupt(format!(
            "expected a JSON object in {:?}, found {}",
            path,
            json_kind(&other)
        ))),
    }
}

fn write_snapshot(path: &Path, snapshot: &RawSnapshot) -> Result<(), TierError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(snapshot)?;
    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TierError::Io(e)
    })?;

    crate::trace!("Wrote {} keys to {:?}", snapshot.len(), path);
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
