//! Content-store collaborator.
//!
//! The remote record store that owns posts. The core only needs to read a
//! project's posts and write them back; the store's own schema is its
//! business.

use crate::approval::Post;
use async_trait::async_trait;
use portal_authorization::ProjectId;
use portal_core::{PortalError, StorageEffects, StorageJsonExt};
use std::sync::Arc;

/// Source of truth for a project's posts.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every post of `project`.
    async fn load_posts(&self, project: ProjectId) -> Result<Vec<Post>, PortalError>;

    /// Replace the posts of `project`.
    async fn save_posts(&self, project: ProjectId, posts: &[Post]) -> Result<(), PortalError>;
}

/// Content store kept in a key-value store, one JSON array per project
/// under `content.posts.<project>`.
///
/// Stands in for the remote store in the CLI and in tests.
#[derive(Clone)]
pub struct StorageContentStore {
    storage: Arc<dyn StorageEffects>,
}

impl StorageContentStore {
    /// Content store over `storage`.
    pub fn new(storage: Arc<dyn StorageEffects>) -> Self {
        Self { storage }
    }

    /// Key holding the posts of `project`.
    pub fn key(project: ProjectId) -> String {
        format!("content.posts.{project}")
    }
}

#[async_trait]
impl ContentStore for StorageContentStore {
    async fn load_posts(&self, project: ProjectId) -> Result<Vec<Post>, PortalError> {
        Ok(self
            .storage
            .retrieve_json::<Vec<Post>>(&Self::key(project))
            .await?
            .unwrap_or_default())
    }

    async fn save_posts(&self, project: ProjectId, posts: &[Post]) -> Result<(), PortalError> {
        self.storage.store_json(&Self::key(project), &posts).await
    }
}
