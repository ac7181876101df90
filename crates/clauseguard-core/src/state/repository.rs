//! Persistence adapter trait.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value storage for engine state that outlives a single operation.
///
/// Only two keys are used: the active session id (short-lived; losing it on
/// restart is acceptable) and the user role preference (long-lived). Writes
/// are last-writer-wins.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Reads a value. `Ok(None)` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
