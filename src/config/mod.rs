//! Settings file for the engine timings, sync switches and tier locations.
//!
//! Stored as camelCase JSON in `settings.json` under the config directory:
//! `$SNAPKEY_CONFIG_DIR` when set, otherwise `<platform config dir>/snapkey`.
//! Every field has a default, so a missing or partial file is fine.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::SyncOptions;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "SNAPKEY_CONFIG_DIR";
/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "snapkey";
pub const SETTINGS_FILE: &str = "settings.json";
/// Default local tier file, relative to the config directory
pub const LOCAL_STORE_FILE: &str = "local.json";

/// Error types for configuration loading and saving
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// User-facing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Read and mirror the remote tier
    pub sync_enabled: bool,
    /// Push merged records back to the remote tier on load
    pub push_merged_to_remote: bool,
    /// Pause after an expansion before the next one may start
    pub recovery_delay_ms: u64,
    /// Pause between pasting and restoring the clipboard
    pub clipboard_restore_delay_ms: u64,
    /// Local tier file; relative paths are under the config directory
    pub local_store_path: Option<PathBuf>,
    /// Remote tier file; no remote tier when absent
    pub remote_store_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sync_enabled: true,
            push_merged_to_remote: false,
            recovery_delay_ms: 150,
            clipboard_restore_delay_ms: 100,
            local_store_path: None,
            remote_store_path: None,
        }
    }
}

impl Settings {
    pub fn recovery_delay(&self) -> Duration {
        Duration::from_millis(self.recovery_delay_ms)
    }

    pub fn clipboard_restore_delay(&self) -> Duration {
        Duration::from_millis(self.clipboard_restore_delay_ms)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            sync_enabled: self.sync_enabled,
            push_merged_to_remote: self.push_merged_to_remote,
        }
    }
}

/// Resolve the config directory
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join(APP_DIR_NAME))
}

/// Settings together with the directory they were loaded from
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub dir: PathBuf,
    pub settings: Settings,
}

impl AppConfig {
    /// Load from the resolved config directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(config_dir()?)
    }

    /// Load from `dir`. A missing settings file yields defaults.
    pub fn load_from(dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        let path = dir.join(SETTINGS_FILE);

        let settings = if path.exists() {
            crate::debug!("Loading settings from {:?}", path);
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            crate::debug!("No settings file at {:?}, using defaults", path);
            Settings::default()
        };

        Ok(Self { dir, settings })
    }

    /// Persist the settings using atomic write (temp file + rename)
    pub fn save(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.settings_path();
        let content = serde_json::to_string_pretty(&self.settings)?;
        let temp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ConfigError::Io(e)
        })?;

        crate::debug!("Settings saved to {:?}", path);
        Ok(())
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn local_store_path(&self) -> PathBuf {
        match &self.settings.local_store_path {
            Some(path) => self.resolve(path),
            None => self.dir.join(LOCAL_STORE_FILE),
        }
    }

    pub fn remote_store_path(&self) -> Option<PathBuf> {
        self.settings
            .remote_store_path
            .as_deref()
            .map(|path| self.resolve(path))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
