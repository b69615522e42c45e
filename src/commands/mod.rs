// CLI commands module
// Argument definitions and dispatch; the handlers live in dictionary.rs and
// expand.rs and return their output as text so they can be tested directly.

pub mod dictionary;
pub mod expand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::{JsonFileTier, StorageError, StorageSync};

#[derive(Debug, Parser)]
#[command(name = "snapkey")]
#[command(about = "Shortcut text expansion with a two-tier synced dictionary", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// List all shortcuts, labelled ones first
    List,

    /// Create or update a shortcut
    Add {
        /// Token to type, e.g. "brb"
        token: String,
        /// Text to insert; may contain {date}, {time} or {datetime}
        replacement: String,
        /// Optional label
        label: Option<String>,
    },

    /// Delete a shortcut
    Remove {
        token: String,
    },

    /// Export the dictionary as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Import shortcuts from an exported JSON file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Type text into an in-memory field and print the expanded result
    Expand {
        text: String,
    },
}

/// What the handlers operate on
pub struct CommandContext {
    pub sync: Arc<StorageSync>,
    pub config: AppConfig,
}

impl CommandContext {
    /// Open the file tiers named by the settings
    pub fn from_config(config: AppConfig) -> Self {
        let local = Arc::new(JsonFileTier::new("local", config.local_store_path()));
        let mut sync = StorageSync::new(local).with_options(config.settings.sync_options());
        if let Some(remote_path) = config.remote_store_path() {
            sync = sync.with_remote(Arc::new(JsonFileTier::new("remote", remote_path)));
        }
        Self {
            sync: Arc::new(sync),
            config,
        }
    }
}

/// Map StorageError to user-friendly error messages
pub(crate) fn to_user_error(error: StorageError) -> String {
    match error {
        StorageError::Validation(e) => format!("Invalid shortcut: {}", e),
        StorageError::Local(e) => format!("Failed to save shortcuts: {}", e),
    }
}

/// Run one command, returning the text to print
pub async fn execute(command: Commands, ctx: &CommandContext) -> Result<String, String> {
    match command {
        Commands::List => Ok(dictionary::list_shortcuts(&ctx.sync).await),
        Commands::Add {
            token,
            replacement,
            label,
        } => dictionary::add_shortcut(&ctx.sync, &token, &replacement, label.as_deref()).await,
        Commands::Remove { token } => dictionary::remove_shortcut(&ctx.sync, &token).await,
        Commands::Export { file } => dictionary::export_shortcuts(&ctx.sync, file.as_deref()).await,
        Commands::Import { file } => dictionary::import_shortcuts(&ctx.sync, &file).await,
        Commands::Expand { text } => Ok(expand::expand_text(&ctx.sync, &ctx.config, &text).await),
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
