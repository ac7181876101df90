//! Persistence adapter that splits keys by lifetime.

use async_trait::async_trait;
use clauseguard_core::error::Result;
use clauseguard_core::state::{PersistenceAdapter, SESSION_ID_KEY};
use std::sync::Arc;

/// Routes the session id to an ephemeral adapter and every other key to a
/// durable one.
pub struct TieredStateStore {
    ephemeral: Arc<dyn PersistenceAdapter>,
    durable: Arc<dyn PersistenceAdapter>,
}

impl TieredStateStore {
    pub fn new(
        ephemeral: Arc<dyn PersistenceAdapter>,
        durable: Arc<dyn PersistenceAdapter>,
    ) -> Self {
        Self { ephemeral, durable }
    }

    fn route(&self, key: &str) -> &Arc<dyn PersistenceAdapter> {
        if key == SESSION_ID_KEY {
            &self.ephemeral
        } else {
            &self.durable
        }
    }
}

#[async_trait]
impl PersistenceAdapter for TieredStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.route(key).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.route(key).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.route(key).remove(key).await
    }
}
