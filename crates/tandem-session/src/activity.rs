//! Last-activity bookkeeping for the idle session.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Interaction signals that count as user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// Pointer or mouse button pressed.
    PointerDown,
    /// Pointer or mouse moved.
    PointerMove,
    /// Key pressed.
    KeyDown,
    /// Document scrolled.
    Scroll,
    /// Touch began.
    TouchStart,
}

impl ActivityKind {
    /// Every observed signal type.
    pub const ALL: [ActivityKind; 5] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyDown,
        Self::Scroll,
        Self::TouchStart,
    ];

    /// Parses a DOM event name.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "pointerdown" | "mousedown" => Some(Self::PointerDown),
            "pointermove" | "mousemove" => Some(Self::PointerMove),
            "keydown" | "keypress" => Some(Self::KeyDown),
            "scroll" | "wheel" => Some(Self::Scroll),
            "touchstart" => Some(Self::TouchStart),
            _ => None,
        }
    }

    /// Canonical DOM event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::PointerMove => "pointermove",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Tracks the last recorded activity instant.
///
/// `last_activity` only moves forward. Updates are throttled to one per
/// `throttle` window unless the caller bypasses the throttle.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    last_activity: Instant,
    last_recorded: Instant,
    throttle: Duration,
}

impl ActivityTracker {
    /// Create a tracker whose last activity is `now`.
    pub fn new(now: Instant, throttle: Duration) -> Self {
        Self {
            last_activity: now,
            last_recorded: now,
            throttle,
        }
    }

    /// The last recorded activity instant.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Idle time at `now`.
    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Observe a signal at `now`. Returns `true` if it was recorded.
    ///
    /// Signals inside the throttle window are ignored unless
    /// `bypass_throttle` is set.
    pub fn observe(&mut self, now: Instant, bypass_throttle: bool) -> bool {
        let window_elapsed = now.saturating_duration_since(self.last_recorded) >= self.throttle;
        if !bypass_throttle && !window_elapsed {
            return false;
        }
        self.touch(now);
        true
    }

    /// Record activity at `now` unconditionally.
    pub fn touch(&mut self, now: Instant) {
        if now > self.last_activity {
            self.last_activity = now;
        }
        self.last_recorded = now;
    }
}
