//! Filesystem storage handler

use async_trait::async_trait;
use portal_core::{StorageEffects, StorageError};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::validate_key;

const EXTENSION: &str = "dat";

/// Filesystem-based storage handler.
///
/// Each key is stored as `<base>/<key>.dat`. Writes go to a temporary file
/// first and are renamed into place, so a concurrent reader in another
/// process sees either the old or the new value, never a torn one.
#[derive(Debug, Clone)]
pub struct FilesystemStorageHandler {
    base_path: PathBuf,
}

impl FilesystemStorageHandler {
    /// Create a handler rooted at `base_path`. The directory is created lazily.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory holding the stored files.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.{EXTENSION}"))
    }
}

#[async_trait]
impl StorageEffects for FilesystemStorageHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        validate_key(key)?;

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create directory: {e}"))
        })?;

        let target = self.file_path(key);
        let staging = self.base_path.join(format!(".{key}.{EXTENSION}.tmp"));
        fs::write(&staging, value)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to write file: {e}")))?;
        fs::rename(&staging, &target)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to move file: {e}")))?;

        tracing::trace!(key, "stored value");
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        match fs::read(self.file_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(format!("Failed to read file: {e}"))),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to remove file: {e}"
            ))),
        }
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read directory: {e}"
                )))
            }
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read directory entry: {e}"))
        })? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with('.') {
                continue;
            }
            let Some(key) = name.strip_suffix(&format!(".{EXTENSION}")) else {
                continue;
            };
            if prefix.map_or(true, |p| key.starts_with(p)) {
                keys.push(key.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStorageHandler::new(dir.path());

        store
            .store("portal.session.principal", b"{}".to_vec())
            .await
            .unwrap();
        assert_eq!(
            store.retrieve("portal.session.principal").await.unwrap(),
            Some(b"{}".to_vec())
        );
        assert!(dir.path().join("portal.session.principal.dat").exists());
    }

    #[tokio::test]
    async fn test_missing_key_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStorageHandler::new(dir.path().join("absent"));

        assert_eq!(store.retrieve("portal.x").await.unwrap(), None);
        assert!(!store.remove("portal.x").await.unwrap());
        assert!(store.list_keys(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_keys_skips_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStorageHandler::new(dir.path());
        store.store("portal.b", Vec::new()).await.unwrap();
        store.store("portal.a", Vec::new()).await.unwrap();
        std::fs::write(dir.path().join(".portal.c.dat.tmp"), b"x").unwrap();

        let keys = store.list_keys(Some("portal.")).await.unwrap();
        assert_eq!(keys, vec!["portal.a".to_string(), "portal.b".to_string()]);
    }

    #[tokio::test]
    async fn test_path_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStorageHandler::new(dir.path());
        let err = store.store("../escape", Vec::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }
}
