//! Unified path management for clauseguard files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/clauseguard/       # Config directory (dirs::config_dir)
//! ├── config.toml              # Engine configuration
//! └── state.toml               # Persisted session id / role preference
//! ```

use clauseguard_core::error::{ClauseError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "clauseguard";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.toml";

/// Resolves clauseguard file locations.
///
/// An explicit base directory replaces the platform config directory, which
/// keeps tests inside a temp dir.
#[derive(Debug, Clone, Default)]
pub struct ClauseguardPaths {
    base_dir: Option<PathBuf>,
}

impl ClauseguardPaths {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the clauseguard configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `ClauseError::Config` if the platform has no config directory.
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ClauseError::config("Cannot find config directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    pub fn state_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(STATE_FILE))
    }
}
