//! Configuration service implementation.
//!
//! Loads the engine configuration from `config.toml` and wires the
//! persistence adapters it describes.

use crate::paths::ClauseguardPaths;
use crate::{FileStateStore, MemoryStateStore, TieredStateStore};
use clauseguard_core::config::ClauseguardConfig;
use clauseguard_core::error::Result;
use clauseguard_core::state::PersistenceAdapter;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the engine configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: ClauseguardPaths,
    /// Cached configuration; `None` until first load.
    config: Arc<RwLock<Option<ClauseguardConfig>>>,
}

impl ConfigService {
    pub fn new(paths: ClauseguardPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it from disk on first access.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClauseError::Serialization` if the file is not valid TOML for
    /// the config model, or `ClauseError::Io` if it cannot be read.
    pub fn get_config(&self) -> Result<ClauseguardConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load_from(&self.paths.config_file()?)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn load_from(path: &Path) -> Result<ClauseguardConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
            return Ok(ClauseguardConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Builds the persistence adapter described by the configuration.
    ///
    /// With `ephemeral_session` the session id lives in memory and only the
    /// role preference reaches the state file.
    pub fn persistence(&self) -> Result<Arc<dyn PersistenceAdapter>> {
        let config = self.get_config()?;
        let state_path = match config.persistence.state_file {
            Some(path) => path,
            None => self.paths.state_file()?,
        };

        let durable: Arc<dyn PersistenceAdapter> = Arc::new(FileStateStore::with_path(state_path));
        if config.persistence.ephemeral_session {
            Ok(Arc::new(TieredStateStore::new(
                Arc::new(MemoryStateStore::new()),
                durable,
            )))
        } else {
            Ok(durable)
        }
    }
}
