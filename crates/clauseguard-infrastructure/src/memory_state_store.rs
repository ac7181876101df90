//! Ephemeral persistence adapter.

use async_trait::async_trait;
use clauseguard_core::error::Result;
use clauseguard_core::state::PersistenceAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps values in memory only; everything is lost with the process.
///
/// Suitable for the short-lived session id, and as a test double.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStateStore::new();
        assert_eq!(store.get("session_id").await.unwrap(), None);

        store.set("session_id", "abc").await.unwrap();
        assert_eq!(store.get("session_id").await.unwrap().as_deref(), Some("abc"));

        store.set("session_id", "def").await.unwrap();
        assert_eq!(store.get("session_id").await.unwrap().as_deref(), Some("def"));

        store.remove("session_id").await.unwrap();
        store.remove("session_id").await.unwrap();
        assert!(store.is_empty().await);
    }
}
