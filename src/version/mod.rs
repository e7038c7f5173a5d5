//! Version Module
//!
//! Detects deployment of a newer build: the build-time stamp, the
//! version-reporting endpoint client, and the polling state machine.

mod build;
mod poller;
mod source;

pub use build::{BuildInfo, VersionInfo};
pub use poller::{
    PollTrigger, PollerConfig, VersionPoller, VersionState, DEFAULT_POLL_INTERVAL,
    DEFAULT_RELOAD_DELAY,
};
pub use source::{check_for_updates, HttpVersionSource, VersionSource};
