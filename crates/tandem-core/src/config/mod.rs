//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! merged with `TANDEM_`-prefixed environment variables via the `config`
//! crate. Each sub-module represents a logical configuration section.

pub mod logging;
pub mod presence;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::presence::PresenceConfig;
pub use self::session::{SessionConfig, SessionThresholds};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Idle session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Presence orchestration settings.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; environment variables such as
    /// `TANDEM_SESSION__AWAY_TIMEOUT_MS` override file values. The session
    /// thresholds are validated before the config is returned.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TANDEM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.session.thresholds()?;
        Ok(config)
    }
}
