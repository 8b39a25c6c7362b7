//! Key-value store that can be made to reject writes.

use async_trait::async_trait;
use portal_core::{StorageEffects, StorageError};
use portal_effects::MemoryStorageHandler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Memory storage whose writes and removals fail while `failing` is set.
/// Reads always work.
#[derive(Debug, Clone, Default)]
pub struct FailingStorage {
    inner: MemoryStorageHandler,
    failing: Arc<AtomicBool>,
}

impl FailingStorage {
    /// Working store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle write failures.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageEffects for FailingStorage {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        if self.is_failing() {
            return Err(StorageError::WriteFailed(format!("{key}: disk full")));
        }
        self.inner.store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.retrieve(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        if self.is_failing() {
            return Err(StorageError::DeleteFailed(format!("{key}: read-only")));
        }
        self.inner.remove(key).await
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        self.inner.list_keys(prefix).await
    }
}
