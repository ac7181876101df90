//! Engine configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every section is
//! optional; missing values take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ClauseguardConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// EnvFilter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PersistenceConfig {
    /// State file location; `None` means the platform config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// Keep the session id in memory only
    #[serde(default = "default_ephemeral_session")]
    pub ephemeral_session: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            state_file: None,
            ephemeral_session: default_ephemeral_session(),
        }
    }
}

fn default_ephemeral_session() -> bool {
    true
}
