//! Shared utilities for the snapkey crate.
//!
//! - `runtime`: Tokio helpers for async-to-sync bridges and deferred work
//! - `text`: char-offset helpers (caret positions are counted in chars, not bytes)

mod runtime;
pub mod text;

pub use runtime::{run_async, run_after};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
