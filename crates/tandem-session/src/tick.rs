//! Periodic tick source decoupled from the session owner.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A single tick emitted by a [`TickSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Sequence number, starting at 1 for every `start()`.
    pub seq: u64,
    /// Scheduled instant of this tick.
    pub at: Instant,
}

/// Emits [`Tick`]s at a fixed period on a dedicated task until stopped.
///
/// Ticks are delivered with `try_send`: if the consumer falls behind, the
/// tick is dropped rather than queued. Consumers recompute from absolute
/// time, so a dropped tick only delays an evaluation.
///
/// Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct TickSource {
    period: Duration,
    sender: mpsc::Sender<Tick>,
    running: Option<(watch::Sender<bool>, JoinHandle<()>)>,
}

impl TickSource {
    /// Create a stopped tick source that will publish into `sender`.
    pub fn new(period: Duration, sender: mpsc::Sender<Tick>) -> Self {
        Self {
            period,
            sender,
            running: None,
        }
    }

    /// Start ticking. Restarts cleanly if already running.
    pub fn start(&mut self) {
        self.stop();

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_ticks(self.period, self.sender.clone(), stop_rx));
        self.running = Some((stop_tx, handle));

        tracing::debug!("Tick source started (period: {:?})", self.period);
    }

    /// Stop ticking. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some((stop_tx, handle)) = self.running.take() {
            let _ = stop_tx.send(true);
            handle.abort();
            tracing::debug!("Tick source stopped");
        }
    }

    /// Whether the tick task is currently running.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks(period: Duration, sender: mpsc::Sender<Tick>, mut stop: watch::Receiver<bool>) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            biased;
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            at = interval.tick() => {
                seq += 1;
                match sender.try_send(Tick { seq, at }) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::trace!("Tick {} dropped, consumer is behind", seq);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }
        }
    }
}
