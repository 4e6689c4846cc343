//! Presence orchestration configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Interval between heartbeats sent to the store.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Route the client is sent to after logout.
    #[serde(default = "default_logout_redirect")]
    pub logout_redirect: String,
    /// Buffer size of the session command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            logout_redirect: default_logout_redirect(),
            command_buffer: default_command_buffer(),
        }
    }
}

impl PresenceConfig {
    /// Heartbeat interval as a duration.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds.max(1))
    }
}

fn default_heartbeat_interval() -> u64 {
    60
}

fn default_logout_redirect() -> String {
    "/".to_string()
}

fn default_command_buffer() -> usize {
    64
}
