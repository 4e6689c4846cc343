//! Fixed-interval presence heartbeat.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::presence::orchestrator::Presence;

/// Run the heartbeat loop for `presence` until `shutdown` flips to `true`
/// or the presence is dropped.
///
/// The first heartbeat is sent immediately, then once per `interval`. The
/// cadence is independent of the idle session's tick source.
pub async fn run_heartbeat(
    presence: Weak<Presence>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let Some(presence) = presence.upgrade() else { break };
                presence.heartbeat().await;
            }
        }
    }

    tracing::debug!("Heartbeat loop ended");
}
