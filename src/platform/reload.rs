//! Reload Module
//!
//! The "reload now" primitive triggered when a newer build is detected.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// Performs a full reload of the running client.
pub trait Reloader: Send + Sync {
    fn reload(&self);
}

// == Log Reloader ==
/// Reloader for headless contexts: records and logs the request.
#[derive(Debug, Default)]
pub struct LogReloader {
    reloads: AtomicU64,
}

impl LogReloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reloads requested so far.
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Reloader for LogReloader {
    fn reload(&self) {
        let count = self.reloads.fetch_add(1, Ordering::SeqCst) + 1;
        info!(reloads = count, "Reload requested for new build");
    }
}
