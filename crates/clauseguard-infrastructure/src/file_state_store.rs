//! Durable persistence adapter backed by a TOML file.

use crate::paths::ClauseguardPaths;
use crate::storage::StateFile;
use async_trait::async_trait;
use clauseguard_core::error::{ClauseError, Result};
use clauseguard_core::state::PersistenceAdapter;
use std::path::PathBuf;

/// Stores values in a flat TOML table on disk.
///
/// Every call runs the blocking file work on `spawn_blocking`.
///
/// # Example
///
/// ```ignore
/// use clauseguard_infrastructure::FileStateStore;
///
/// let store = FileStateStore::new()?;
/// store.set("user_role", "expert").await?;
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    file: StateFile,
}

impl FileStateStore {
    /// Creates a store at the default location (`<config_dir>/clauseguard/state.toml`).
    pub fn new() -> Result<Self> {
        let path = ClauseguardPaths::default().state_file()?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: StateFile::new(path),
        }
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(StateFile) -> Result<T> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| ClauseError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[async_trait]
impl PersistenceAdapter for FileStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.run_blocking(move |file| Ok(file.read()?.remove(&key)))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!("[FileStateStore] set key={}", key);
        let key = key.to_string();
        let value = value.to_string();
        self.run_blocking(move |file| {
            file.modify(|table| table.insert(key, value.clone()).as_ref() != Some(&value))
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        tracing::debug!("[FileStateStore] remove key={}", key);
        let key = key.to_string();
        self.run_blocking(move |file| file.modify(|table| table.remove(&key).is_some()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_values_survive_a_new_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");

        let store = FileStateStore::with_path(path.clone());
        store.set("user_role", "expert").await.unwrap();
        store.set("session_id", "s-1").await.unwrap();

        let reopened = FileStateStore::with_path(path);
        assert_eq!(
            reopened.get("user_role").await.unwrap().as_deref(),
            Some("expert")
        );
        assert_eq!(
            reopened.get("session_id").await.unwrap().as_deref(),
            Some("s-1")
        );
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStateStore::with_path(temp_dir.path().join("state.toml"));

        store.set("session_id", "s-1").await.unwrap();
        store.remove("session_id").await.unwrap();
        store.remove("session_id").await.unwrap();
        assert_eq!(store.get("session_id").await.unwrap(), None);
    }
}
