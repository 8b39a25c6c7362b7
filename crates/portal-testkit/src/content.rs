//! Content store whose availability tests can switch.

use async_trait::async_trait;
use portal_app::{ContentStore, Post};
use portal_authorization::ProjectId;
use portal_core::PortalError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory content store that can be taken offline and counts writes.
///
/// Clones share state, so a test can keep a handle while the app owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct ControlledContentStore {
    posts: Arc<Mutex<BTreeMap<ProjectId, Vec<Post>>>>,
    offline: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl ControlledContentStore {
    /// Empty, online store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put posts in place without counting a save.
    pub fn seed(&self, project: ProjectId, posts: Vec<Post>) {
        self.posts.lock().unwrap().insert(project, posts);
    }

    /// Make every call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// What the store holds for `project`.
    pub fn stored(&self, project: ProjectId) -> Vec<Post> {
        self.posts
            .lock()
            .unwrap()
            .get(&project)
            .cloned()
            .unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), PortalError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(PortalError::storage("content store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentStore for ControlledContentStore {
    async fn load_posts(&self, project: ProjectId) -> Result<Vec<Post>, PortalError> {
        self.check_online()?;
        Ok(self.stored(project))
    }

    async fn save_posts(&self, project: ProjectId, posts: &[Post]) -> Result<(), PortalError> {
        self.check_online()?;
        self.posts.lock().unwrap().insert(project, posts.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
