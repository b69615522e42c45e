// Snapkey: shortcut text expansion with a two-tier synced dictionary

// Enable coverage attribute on nightly for explicit exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod commands;
pub mod config;
pub mod dictionary;
pub mod events;
pub mod expansion;
pub mod field;
pub mod storage;
pub mod template;
pub mod util;

use clap::Parser;
use std::process::ExitCode;

// Re-export log macros for use throughout the crate
pub use log::{debug, error, info, trace, warn};

/// CLI entry point: parse arguments, load settings, run one command.
/// Note: This function cannot be unit tested as it reads the process arguments.
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn run() -> ExitCode {
    init_logging();
    let cli = commands::Cli::parse();

    match run_command(cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the build-dependent default level
fn init_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn run_command(command: commands::Commands) -> Result<String, String> {
    let config = config::AppConfig::load().map_err(|e| e.to_string())?;
    debug!("Using config directory {:?}", config.dir);

    let ctx = commands::CommandContext::from_config(config);
    util::run_async(commands::execute(command, &ctx))
        .map_err(|e| format!("Failed to start async runtime: {}", e))?
}
