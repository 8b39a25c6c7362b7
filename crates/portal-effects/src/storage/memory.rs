//! In-memory storage handler

use async_trait::async_trait;
use portal_core::{StorageEffects, StorageError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::validate_key;

/// In-memory storage handler.
///
/// Clones share the same map, which lets tests hand one store to several
/// `AppCore` instances and observe cross-instance effects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageHandler {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStorageHandler {
    /// Create a new memory storage handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// True if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl StorageEffects for MemoryStorageHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        validate_key(key)?;
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.data.write().await.remove(key).is_some())
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        let data = self.data.read().await;
        Ok(data
            .keys()
            .filter(|k| prefix.map_or(true, |p| k.starts_with(p)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_retrieve_remove() {
        let store = MemoryStorageHandler::new();
        store.store("portal.a", b"1".to_vec()).await.unwrap();

        assert_eq!(store.retrieve("portal.a").await.unwrap(), Some(b"1".to_vec()));
        assert!(store.remove("portal.a").await.unwrap());
        assert!(!store.remove("portal.a").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_keys_by_prefix_sorted() {
        let store = MemoryStorageHandler::new();
        for key in ["portal.b", "portal.a", "other.c"] {
            store.store(key, Vec::new()).await.unwrap();
        }

        let keys = store.list_keys(Some("portal.")).await.unwrap();
        assert_eq!(keys, vec!["portal.a".to_string(), "portal.b".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let store = MemoryStorageHandler::new();
        let err = store.store("", Vec::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }
}
