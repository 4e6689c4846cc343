//! Presence status definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Persisted user status, owned server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// User is active.
    Online,
    /// User is signed in but idle.
    Away,
    /// User is signed out or chose to appear offline.
    Offline,
    /// Ghost mode: signed in, hidden from others.
    Invisible,
}

impl UserStatus {
    /// Parses from a string, returning `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "online" => Some(Self::Online),
            "away" => Some(Self::Away),
            "offline" => Some(Self::Offline),
            "invisible" | "ghost" => Some(Self::Invisible),
            _ => None,
        }
    }

    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Away => "AWAY",
            Self::Offline => "OFFLINE",
            Self::Invisible => "INVISIBLE",
        }
    }

    /// Whether this status was set by hand and suppresses automatic updates.
    pub fn is_manual_override(&self) -> bool {
        matches!(self, Self::Offline | Self::Invisible)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the idle session machine.
///
/// Logout is an event, not a resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Recent activity.
    Online,
    /// Idle past the away threshold.
    Away,
    /// Idle past the warning threshold, logout pending.
    Warning,
}

impl SessionStatus {
    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Away => "AWAY",
            Self::Warning => "WARNING",
        }
    }

    /// The user status a session status is reported as, if any.
    pub fn as_user_status(&self) -> Option<UserStatus> {
        match self {
            Self::Online => Some(UserStatus::Online),
            Self::Away => Some(UserStatus::Away),
            Self::Warning => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
