//! Optimistic writes, degraded sync levels and cross-instance reloads.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use portal_app::{core::posts_cache_key, workflows, PostId, PostStatus, SyncLevel};
use portal_authorization::{CredentialSlot, ProjectId};
use portal_testkit::{pending_posts, project_login, TestApp};

async fn zrmc_admin(t: &TestApp) {
    let (user, pass) = project_login(ProjectId::Zrmc, CredentialSlot::Administrator);
    workflows::login(&t.app, &user, &pass).await.unwrap();
}

#[tokio::test]
async fn test_remote_failure_keeps_change_and_reports_local_only() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 2));
    zrmc_admin(&t).await;
    workflows::load_posts(&t.app).await.unwrap();

    t.content.set_offline(true);
    let outcome = workflows::approve_post(&t.app, &PostId::from("zp-1"), None)
        .await
        .unwrap();
    assert!(outcome.is_applied());

    let status = workflows::sync_status(&t.app).await;
    assert_eq!(status.level, SyncLevel::LocalOnly);
    assert!(status.message.is_some());
    assert_eq!(
        workflows::approval_view(&t.app).await.posts().scheduled().len(),
        1
    );
    assert_eq!(t.content.stored(ProjectId::Zrmc)[0].status(), PostStatus::Pending);
}

#[tokio::test]
async fn test_total_failure_reports_error_without_rollback() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 2));
    zrmc_admin(&t).await;
    workflows::load_posts(&t.app).await.unwrap();

    t.content.set_offline(true);
    t.storage.set_failing(true);
    workflows::approve_all(&t.app).await.unwrap();

    assert_eq!(workflows::sync_status(&t.app).await.level, SyncLevel::Error);
    assert_eq!(
        workflows::approval_view(&t.app).await.posts().scheduled().len(),
        2
    );
}

#[tokio::test]
async fn test_recovery_reports_synced_again() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 2));
    zrmc_admin(&t).await;

    t.content.set_offline(true);
    workflows::approve_post(&t.app, &PostId::from("zp-1"), None)
        .await
        .unwrap_err();

    t.content.set_offline(false);
    workflows::load_posts(&t.app).await.unwrap();
    workflows::approve_post(&t.app, &PostId::from("zp-1"), None)
        .await
        .unwrap();
    assert_eq!(workflows::sync_status(&t.app).await.level, SyncLevel::Synced);
}

#[tokio::test]
async fn test_load_falls_back_to_cache() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 3));
    zrmc_admin(&t).await;
    workflows::load_posts(&t.app).await.unwrap();

    t.content.set_offline(true);
    let state = workflows::load_posts(&t.app).await.unwrap();
    assert_eq!(state.pending().len(), 3);
    assert_eq!(workflows::sync_status(&t.app).await.level, SyncLevel::LocalOnly);
}

#[tokio::test]
async fn test_load_without_cache_or_remote_fails() {
    let t = TestApp::new();
    zrmc_admin(&t).await;
    t.content.set_offline(true);

    assert!(workflows::load_posts(&t.app).await.is_err());
    assert_eq!(workflows::sync_status(&t.app).await.level, SyncLevel::Error);
}

#[tokio::test]
async fn test_other_instance_picks_up_post_cache_and_sync_status() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 2));
    zrmc_admin(&t).await;
    workflows::load_posts(&t.app).await.unwrap();

    let other = t.sibling();
    workflows::rehydrate(&other.app).await.unwrap();
    workflows::load_posts(&other.app).await.unwrap();

    t.content.set_offline(true);
    workflows::approve_all(&t.app).await.unwrap();

    workflows::on_storage_changed(&other.app, &posts_cache_key(ProjectId::Zrmc))
        .await
        .unwrap();
    workflows::on_storage_changed(&other.app, "portal.sync.status")
        .await
        .unwrap();

    let view = workflows::approval_view(&other.app).await;
    assert_eq!(view.posts().scheduled().len(), 2);
    assert_eq!(
        workflows::sync_status(&other.app).await,
        workflows::sync_status(&t.app).await
    );

    workflows::on_storage_changed(&other.app, "unrelated.key")
        .await
        .unwrap();
}
