//! Tokio runtime helpers for async-to-sync bridges.
//!
//! The engine and storage layers are async, but the CLI entry point and
//! `Drop` impls are synchronous. These helpers bridge the two without
//! assuming a runtime is (or is not) already running.

use std::time::Duration;

/// Run an async future to completion from synchronous code.
///
/// If a multi-threaded Tokio runtime is already running, blocks the current
/// worker with `block_in_place`. Otherwise a temporary runtime is built.
///
/// # Errors
/// Returns the I/O error from runtime construction when no runtime is
/// available and a new one cannot be created.
pub fn run_async<F, T>(future: F) -> std::io::Result<T>
where
    F: std::future::Future<Output = T>,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(tokio::task::block_in_place(|| handle.block_on(future))),
        Err(_) => {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            Ok(rt.block_on(future))
        }
    }
}

/// Run `task` after `delay` on the current Tokio runtime.
///
/// Without a runtime, or with a zero delay, `task` runs immediately on the
/// calling thread. Used by guards whose release must happen even when the
/// owner is dropped outside async context.
pub fn run_after<F>(delay: Duration, task: F)
where
    F: FnOnce() + Send + 'static,
{
    if delay.is_zero() {
        task();
        return;
    }

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                task();
            });
        }
        Err(_) => {
            crate::trace!("No Tokio runtime for deferred task, running immediately");
            task();
        }
    }
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;
