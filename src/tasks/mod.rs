//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: Removes expired cache entries at configured intervals
//! - Version poll: Checks for a newer build on mount, interval and focus

mod cleanup;
mod poll;

pub use cleanup::spawn_cleanup_task;
pub use poll::spawn_version_poller;
