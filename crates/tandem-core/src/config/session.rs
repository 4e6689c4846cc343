//! Idle session lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Idle session configuration, expressed in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time before the session is reported as away.
    #[serde(default = "default_away_timeout")]
    pub away_timeout_ms: u64,
    /// Idle time before the logout warning is raised.
    #[serde(default = "default_warning_timeout")]
    pub warning_timeout_ms: u64,
    /// Idle time before the session is logged out.
    #[serde(default = "default_logout_timeout")]
    pub logout_timeout_ms: u64,
    /// Period of the tick source.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Minimum spacing between two recorded activity updates.
    #[serde(default = "default_activity_throttle")]
    pub activity_throttle_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            away_timeout_ms: default_away_timeout(),
            warning_timeout_ms: default_warning_timeout(),
            logout_timeout_ms: default_logout_timeout(),
            tick_interval_ms: default_tick_interval(),
            activity_throttle_ms: default_activity_throttle(),
        }
    }
}

impl SessionConfig {
    /// Build validated thresholds from this configuration.
    pub fn thresholds(&self) -> Result<SessionThresholds, AppError> {
        SessionThresholds::new(
            Duration::from_millis(self.away_timeout_ms),
            Duration::from_millis(self.warning_timeout_ms),
            Duration::from_millis(self.logout_timeout_ms),
        )
    }

    /// Tick source period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Activity throttle window.
    pub fn activity_throttle(&self) -> Duration {
        Duration::from_millis(self.activity_throttle_ms)
    }
}

/// The three escalation thresholds of an idle session.
///
/// Always strictly ascending: `away < warning < logout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionThresholds {
    away: Duration,
    warning: Duration,
    logout: Duration,
}

impl SessionThresholds {
    /// Create thresholds, rejecting zero or non-ascending values.
    pub fn new(away: Duration, warning: Duration, logout: Duration) -> Result<Self, AppError> {
        if away.is_zero() {
            return Err(AppError::validation("away timeout must be greater than zero"));
        }
        if away >= warning {
            return Err(AppError::validation(format!(
                "away timeout ({away:?}) must be shorter than warning timeout ({warning:?})"
            )));
        }
        if warning >= logout {
            return Err(AppError::validation(format!(
                "warning timeout ({warning:?}) must be shorter than logout timeout ({logout:?})"
            )));
        }
        Ok(Self {
            away,
            warning,
            logout,
        })
    }

    /// Idle time before AWAY.
    pub fn away(&self) -> Duration {
        self.away
    }

    /// Idle time before WARNING.
    pub fn warning(&self) -> Duration {
        self.warning
    }

    /// Idle time before LOGOUT.
    pub fn logout(&self) -> Duration {
        self.logout
    }

    /// Time between the warning and the logout.
    pub fn logout_countdown(&self) -> Duration {
        self.logout - self.warning
    }
}

fn default_away_timeout() -> u64 {
    300_000
}

fn default_warning_timeout() -> u64 {
    900_000
}

fn default_logout_timeout() -> u64 {
    930_000
}

fn default_tick_interval() -> u64 {
    1_000
}

fn default_activity_throttle() -> u64 {
    1_000
}
