//! Switching projects while a mutation is still loading posts.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use async_lock::RwLock;
use async_trait::async_trait;
use portal_app::{workflows, AppConfig, AppCore, ContentStore, Post, PostStatus};
use portal_authorization::ProjectId;
use portal_core::PortalError;
use portal_testkit::{clock::FixedClock, pending_posts, ControlledContentStore, SUPER_ADMIN};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Content store whose first load stops until the test releases it.
struct HeldLoad {
    inner: ControlledContentStore,
    armed: AtomicBool,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl ContentStore for HeldLoad {
    async fn load_posts(&self, project: ProjectId) -> Result<Vec<Post>, PortalError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.load_posts(project).await
    }

    async fn save_posts(&self, project: ProjectId, posts: &[Post]) -> Result<(), PortalError> {
        self.inner.save_posts(project, posts).await
    }
}

#[tokio::test]
async fn test_switch_during_load_leaves_first_project_untouched() {
    let content = ControlledContentStore::new();
    content.seed(ProjectId::Sbh, pending_posts("sp", 3));
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let store = HeldLoad {
        inner: content.clone(),
        armed: AtomicBool::new(true),
        entered: entered.clone(),
        release: release.clone(),
    };
    let core = AppCore::new(AppConfig::default())
        .unwrap()
        .with_content_store(Arc::new(store))
        .with_clock(Arc::new(FixedClock::default()));
    let app = Arc::new(RwLock::new(core));

    workflows::login(&app, SUPER_ADMIN.0, SUPER_ADMIN.1).await.unwrap();
    workflows::select_project(&app, ProjectId::Sbh).await.unwrap();

    let (approved, _) = tokio::join!(workflows::approve_all(&app), async {
        entered.notified().await;
        workflows::select_project(&app, ProjectId::Zrmc).await.unwrap();
        release.notify_one();
    });

    assert_matches!(approved, Err(PortalError::Invalid { .. }));
    assert_eq!(content.save_count(), 0);
    assert!(content
        .stored(ProjectId::Sbh)
        .iter()
        .all(|p| p.status() == PostStatus::Pending));
    assert_ne!(
        workflows::approval_view(&app).await.project(),
        Some(ProjectId::Sbh)
    );
}

#[tokio::test]
async fn test_after_switch_mutations_target_new_project() {
    let content = ControlledContentStore::new();
    content.seed(ProjectId::Sbh, pending_posts("sp", 2));
    content.seed(ProjectId::Zrmc, pending_posts("zp", 1));
    let core = AppCore::new(AppConfig::default())
        .unwrap()
        .with_content_store(Arc::new(content.clone()))
        .with_clock(Arc::new(FixedClock::default()));
    let app = Arc::new(RwLock::new(core));

    workflows::login(&app, SUPER_ADMIN.0, SUPER_ADMIN.1).await.unwrap();
    workflows::select_project(&app, ProjectId::Sbh).await.unwrap();
    workflows::load_posts(&app).await.unwrap();
    workflows::select_project(&app, ProjectId::Zrmc).await.unwrap();

    let outcome = workflows::approve_all(&app).await.unwrap();
    assert_eq!(outcome.applied().unwrap().applied.len(), 1);
    assert!(content
        .stored(ProjectId::Sbh)
        .iter()
        .all(|p| p.status() == PostStatus::Pending));
    assert_eq!(
        workflows::approval_view(&app).await.project(),
        Some(ProjectId::Zrmc)
    );
}
