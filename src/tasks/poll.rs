//! Version Poll Task
//!
//! Drives a `VersionPoller` from one loop: a check on start, then one per
//! interval tick or focus event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::version::{PollTrigger, VersionPoller};

/// Shortest period the loop will tick at; `interval` rejects zero.
const MIN_POLL_PERIOD: Duration = Duration::from_millis(1);

enum Wake {
    Tick,
    Focus(Option<()>),
}

/// Spawns the polling loop for `poller`.
///
/// `focus_events` carries one message per focus regain; pass `None` where
/// there is no focus concept. Abort the returned handle to tear down.
pub fn spawn_version_poller(
    poller: Arc<VersionPoller>,
    focus_events: Option<mpsc::Receiver<()>>,
) -> JoinHandle<()> {
    let period = poller.config().interval.max(MIN_POLL_PERIOD);

    tokio::spawn(async move {
        info!(
            version = %poller.current_version(),
            interval_ms = period.as_millis() as u64,
            "Starting version poller"
        );

        poller.check_for_update(PollTrigger::Mount).await;

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately and the mount check covered it
        ticker.tick().await;

        let mut focus = focus_events;
        loop {
            let wake = tokio::select! {
                _ = ticker.tick() => Wake::Tick,
                event = next_focus(&mut focus) => Wake::Focus(event),
            };

            match wake {
                Wake::Tick => {
                    poller.check_for_update(PollTrigger::Interval).await;
                }
                Wake::Focus(Some(())) => {
                    poller.check_for_update(PollTrigger::Focus).await;
                }
                Wake::Focus(None) => {
                    debug!("Focus channel closed, polling on interval only");
                    focus = None;
                }
            }
        }
    })
}

async fn next_focus(focus: &mut Option<mpsc::Receiver<()>>) -> Option<()> {
    match focus {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
