//! Key-value storage effect interface.

use crate::PortalError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type for storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StorageError {
    /// Key was empty or otherwise unusable
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
    /// Read failed
    #[error("Read failed: {0}")]
    ReadFailed(String),
    /// Write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),
    /// Delete failed
    #[error("Delete failed: {0}")]
    DeleteFailed(String),
    /// Store is unreachable
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for PortalError {
    fn from(err: StorageError) -> Self {
        PortalError::storage(err.to_string())
    }
}

/// Durable key-value storage.
///
/// Keys are flat strings; callers namespace them with dotted prefixes such as
/// `portal.session.principal`.
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Store a value, overwriting any existing one.
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Retrieve a value, `None` if absent.
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove a value; returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// List keys, optionally filtered by prefix, in sorted order.
    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError>;
}

/// JSON helpers over any [`StorageEffects`] implementation.
#[async_trait]
pub trait StorageJsonExt: StorageEffects {
    /// Serialize `value` as JSON and store it.
    async fn store_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> crate::Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store(key, bytes).await?;
        Ok(())
    }

    /// Retrieve and deserialize a JSON value.
    async fn retrieve_json<T: DeserializeOwned + Send>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.retrieve(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl<S: StorageEffects + ?Sized> StorageJsonExt for S {}
