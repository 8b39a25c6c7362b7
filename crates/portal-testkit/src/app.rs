//! Fully wired test application.

use crate::clock::FixedClock;
use crate::content::ControlledContentStore;
use crate::storage::FailingStorage;
use async_lock::RwLock;
use portal_app::{AppConfig, AppCore, Post, SyncStatusBroadcaster};
use portal_authorization::{CredentialSlot, PermissionMatrix, ProjectId, ProjectRegistry};
use std::sync::Arc;

/// Built-in super admin login.
pub const SUPER_ADMIN: (&str, &str) = ("bre", "1Lampshade!");

/// An [`AppCore`] over in-memory handlers, with handles to each of them.
pub struct TestApp {
    /// The app under test
    pub app: Arc<RwLock<AppCore>>,
    /// Its clock
    pub clock: FixedClock,
    /// Its content store
    pub content: ControlledContentStore,
    /// Its key-value store
    pub storage: FailingStorage,
    /// Its sync broadcaster
    pub sync: SyncStatusBroadcaster,
}

impl TestApp {
    /// Default configuration and the standard matrix.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, None)
    }

    /// Custom permission matrix.
    pub fn with_matrix(matrix: PermissionMatrix) -> Self {
        Self::build(AppConfig::default(), Some(matrix))
    }

    /// A second app sharing this one's storage, as another process would.
    pub fn sibling(&self) -> Self {
        let clock = self.clock.clone();
        let sync = SyncStatusBroadcaster::new(Arc::new(clock.clone()), 8);
        let core = AppCore::new(AppConfig::default())
            .unwrap()
            .with_storage(Arc::new(self.storage.clone()))
            .with_content_store(Arc::new(self.content.clone()))
            .with_clock(Arc::new(clock.clone()))
            .with_sync(sync.clone());
        Self {
            app: Arc::new(RwLock::new(core)),
            clock,
            content: self.content.clone(),
            storage: self.storage.clone(),
            sync,
        }
    }

    fn build(config: AppConfig, matrix: Option<PermissionMatrix>) -> Self {
        let clock = FixedClock::default();
        let content = ControlledContentStore::new();
        let storage = FailingStorage::new();
        let sync = SyncStatusBroadcaster::new(Arc::new(clock.clone()), config.sync_channel_capacity);

        let mut core = AppCore::new(config)
            .unwrap()
            .with_storage(Arc::new(storage.clone()))
            .with_content_store(Arc::new(content.clone()))
            .with_clock(Arc::new(clock.clone()))
            .with_sync(sync.clone());
        if let Some(matrix) = matrix {
            core = core.with_matrix(matrix);
        }

        Self {
            app: Arc::new(RwLock::new(core)),
            clock,
            content,
            storage,
            sync,
        }
    }

    /// Put posts in the content store.
    pub fn seed_posts(&self, project: ProjectId, posts: Vec<Post>) {
        self.content.seed(project, posts);
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Login pair of one of a project's built-in accounts.
pub fn project_login(project: ProjectId, slot: CredentialSlot) -> (String, String) {
    let pair = ProjectRegistry::global()
        .get(project)
        .credentials
        .pair(slot);
    (pair.username.clone(), pair.password().to_string())
}
