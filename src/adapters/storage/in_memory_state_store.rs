//! In-Memory State Store Adapter
//!
//! Keeps workspace blobs in memory. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{StateKey, StateStore, StateStoreError};

/// In-memory store for workspace blobs
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    blobs: Arc<RwLock<HashMap<StateKey, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later save and remove fail with an IO error.
    pub fn with_failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    fn check_writable(&self) -> Result<(), StateStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StateStoreError::IoError("store is read-only".to_string()));
        }
        Ok(())
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.blobs.write().await.clear();
    }

    /// Number of keys currently present
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    pub async fn contains(&self, key: StateKey) -> bool {
        self.blobs.read().await.contains_key(&key)
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, key: StateKey) -> Result<Option<String>, StateStoreError> {
        Ok(self.blobs.read().await.get(&key).cloned())
    }

    async fn save(&self, key: StateKey, blob: String) -> Result<(), StateStoreError> {
        self.check_writable()?;
        self.blobs.write().await.insert(key, blob);
        Ok(())
    }

    async fn remove(&self, key: StateKey) -> Result<(), StateStoreError> {
        self.check_writable()?;
        self.blobs.write().await.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_remove() {
        let store = InMemoryStateStore::new();

        store.save(StateKey::ChatHistory, "[]".to_string()).await.unwrap();
        assert_eq!(
            store.load(StateKey::ChatHistory).await.unwrap().as_deref(),
            Some("[]")
        );

        store.remove(StateKey::ChatHistory).await.unwrap();
        assert_eq!(store.load(StateKey::ChatHistory).await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn failing_writes_surface_io_errors() {
        let store = InMemoryStateStore::new().with_failing_writes();

        let err = store.save(StateKey::ChatHistory, "[]".to_string()).await.unwrap_err();

        assert!(matches!(err, StateStoreError::IoError(_)));
        assert!(store.remove(StateKey::ChatHistory).await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = InMemoryStateStore::new();
        let other = store.clone();

        let handle = tokio::spawn(async move {
            other
                .save(StateKey::SavedAnalyses, "[]".to_string())
                .await
                .unwrap();
        });
        handle.await.unwrap();

        assert!(store.contains(StateKey::SavedAnalyses).await);
        assert_eq!(store.len().await, 1);

        store.clear().await;
        assert!(store.is_empty().await);
    }
}
