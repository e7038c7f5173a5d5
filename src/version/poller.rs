//! Version Poller Module
//!
//! Idle/Checking state machine driven by mount, interval, focus and manual
//! triggers. Publishes the update-available flag and owns the reload action.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::platform::Reloader;
use crate::version::VersionSource;

/// Default time between interval checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Delay between detecting an update and an automatic reload, so the
/// notification is visible first.
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_secs(2);

// == Version State ==
/// Snapshot of the poller, published to subscribers on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionState {
    /// Version of the running build; never changes
    pub current_version: String,
    /// Last successful check saw a different server version
    pub is_update_available: bool,
    /// A check is in flight
    pub is_checking: bool,
}

/// What caused a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTrigger {
    Mount,
    Interval,
    Focus,
    Manual,
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Reload automatically once an update is detected
    pub auto_reload: bool,
    pub reload_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            auto_reload: false,
            reload_delay: DEFAULT_RELOAD_DELAY,
        }
    }
}

// == Version Poller ==
pub struct VersionPoller {
    source: Arc<dyn VersionSource>,
    reloader: Arc<dyn Reloader>,
    config: PollerConfig,
    state: watch::Sender<VersionState>,
}

impl VersionPoller {
    pub fn new(
        current_version: impl Into<String>,
        source: Arc<dyn VersionSource>,
        reloader: Arc<dyn Reloader>,
        config: PollerConfig,
    ) -> Self {
        let (state, _) = watch::channel(VersionState {
            current_version: current_version.into(),
            is_update_available: false,
            is_checking: false,
        });

        Self {
            source,
            reloader,
            config,
            state,
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn state(&self) -> VersionState {
        self.state.borrow().clone()
    }

    pub fn current_version(&self) -> String {
        self.state.borrow().current_version.clone()
    }

    pub fn is_update_available(&self) -> bool {
        self.state.borrow().is_update_available
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<VersionState> {
        self.state.subscribe()
    }

    // == Check For Update ==
    /// Runs one version check unless one is already in flight.
    ///
    /// An overlapping call returns the current flag without issuing a
    /// request; it is dropped, not queued. A failed check leaves the flag as
    /// it was. Returns the flag after the check.
    pub async fn check_for_update(&self, trigger: PollTrigger) -> bool {
        let acquired = self.state.send_if_modified(|state| {
            if state.is_checking {
                false
            } else {
                state.is_checking = true;
                true
            }
        });

        if !acquired {
            debug!(?trigger, "Version check already in flight, skipping");
            return self.is_update_available();
        }

        // Clears `is_checking` even if this future is dropped mid-request
        let guard = CheckGuard(&self.state);

        debug!(?trigger, "Checking for new version");
        let outcome = self.source.fetch_version().await;

        let mut newly_available = false;
        self.state.send_modify(|state| {
            state.is_checking = false;
            if let Ok(info) = &outcome {
                let available = info.version != state.current_version;
                newly_available = available && !state.is_update_available;
                state.is_update_available = available;
            }
        });
        drop(guard);

        match outcome {
            Ok(info) if newly_available => {
                info!(
                    current = %self.current_version(),
                    server = %info.version,
                    "New version available"
                );
                if self.config.auto_reload {
                    self.schedule_reload();
                }
            }
            Ok(_) => {}
            Err(err) => warn!(?trigger, error = %err, "Version check failed, keeping last state"),
        }

        self.is_update_available()
    }

    // == Reload ==
    /// Reloads immediately, whether or not an update was detected.
    pub fn reload_now(&self) {
        info!("Reloading to pick up new build");
        self.reloader.reload();
    }

    fn schedule_reload(&self) {
        let reloader = Arc::clone(&self.reloader);
        let delay = self.config.reload_delay;
        info!(delay_ms = delay.as_millis() as u64, "Scheduling automatic reload");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            reloader.reload();
        });
    }
}

/// Releases the in-flight marker when a check ends or is cancelled.
struct CheckGuard<'a>(&'a watch::Sender<VersionState>);

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        self.0
            .send_if_modified(|state| std::mem::replace(&mut state.is_checking, false));
    }
}
