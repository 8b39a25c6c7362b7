//! Storage effect handlers.

mod filesystem;
mod memory;

pub use filesystem::FilesystemStorageHandler;
pub use memory::MemoryStorageHandler;

use portal_core::StorageError;

/// Reject keys that are empty or could escape a storage directory.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            reason: "Key cannot be empty".to_string(),
        });
    }
    if key.contains('/') || key.contains('\\') || key.starts_with('.') || key.contains("..") {
        return Err(StorageError::InvalidKey {
            reason: format!("Key contains path characters: {key}"),
        });
    }
    Ok(())
}
