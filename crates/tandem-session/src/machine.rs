//! The idle escalation state machine.
//!
//! Idle time is recomputed from the last recorded activity on every tick,
//! so delayed or dropped ticks never accumulate error: the next delivered
//! tick sees the true idle time and may jump straight from ONLINE to
//! WARNING or LOGOUT.

use std::time::Duration;

use tokio::time::Instant;

use tandem_core::config::SessionThresholds;
use tandem_core::traits::LogoutWarning;
use tandem_core::types::SessionStatus;

use crate::activity::ActivityTracker;

/// A transition emitted by the [`SessionMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved to ONLINE or AWAY.
    StatusChanged(SessionStatus),
    /// The session entered WARNING.
    LogoutWarning(LogoutWarning),
    /// Idle time reached the logout threshold.
    Logout,
}

/// ONLINE → AWAY → WARNING → LOGOUT, reset to ONLINE by any activity.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    thresholds: SessionThresholds,
    tracker: ActivityTracker,
    status: SessionStatus,
    /// Set once `Logout` fired; cleared only by fresh activity.
    logged_out: bool,
}

impl SessionMachine {
    /// Create a machine in ONLINE with `now` as the last activity.
    pub fn new(thresholds: SessionThresholds, activity_throttle: Duration, now: Instant) -> Self {
        Self {
            thresholds,
            tracker: ActivityTracker::new(now, activity_throttle),
            status: SessionStatus::Online,
            logged_out: false,
        }
    }

    /// Current state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether `Logout` has fired and not yet been re-armed by activity.
    pub fn is_logged_out(&self) -> bool {
        self.logged_out
    }

    /// Idle time at `now`.
    pub fn idle(&self, now: Instant) -> Duration {
        self.tracker.idle(now)
    }

    /// Evaluate the escalation rules at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<SessionEvent> {
        if self.logged_out {
            return None;
        }

        let idle = self.tracker.idle(now);

        if idle >= self.thresholds.logout() {
            self.logged_out = true;
            self.tracker.touch(now);
            return Some(SessionEvent::Logout);
        }

        if idle >= self.thresholds.warning() {
            if self.status == SessionStatus::Warning {
                return None;
            }
            self.status = SessionStatus::Warning;
            return Some(SessionEvent::LogoutWarning(LogoutWarning {
                visible_for: self.thresholds.logout_countdown(),
            }));
        }

        if idle >= self.thresholds.away() && self.status == SessionStatus::Online {
            self.status = SessionStatus::Away;
            return Some(SessionEvent::StatusChanged(SessionStatus::Away));
        }

        None
    }

    /// Feed an activity signal observed at `now`.
    ///
    /// While escalated the throttle is bypassed so the reset is immediate.
    pub fn record_activity(&mut self, now: Instant) -> Option<SessionEvent> {
        let escalated = self.status != SessionStatus::Online || self.logged_out;
        if !self.tracker.observe(now, escalated) {
            return None;
        }
        self.back_online()
    }

    /// Manual equivalent of an activity signal, never throttled.
    pub fn reset_timer(&mut self, now: Instant) -> Option<SessionEvent> {
        self.tracker.touch(now);
        self.back_online()
    }

    fn back_online(&mut self) -> Option<SessionEvent> {
        self.logged_out = false;
        if self.status == SessionStatus::Online {
            return None;
        }
        self.status = SessionStatus::Online;
        Some(SessionEvent::StatusChanged(SessionStatus::Online))
    }
}
