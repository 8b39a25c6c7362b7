//! Post lifecycle through the workflow layer: gating, batches, persistence.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use portal_app::{workflows, AppConfig, BatchAction, Outcome, PostId, PostStatus, Refusal, SyncLevel};
use portal_authorization::{CapabilitySet, CredentialSlot, PermissionMatrix, ProjectId, Role};
use portal_core::{PhysicalTime, PortalError};
use portal_testkit::{clock::TEST_EPOCH_MS, pending_posts, project_login, PostBuilder, TestApp};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

async fn zrmc_signed_in(t: &TestApp) {
    let (user, pass) = project_login(ProjectId::Zrmc, CredentialSlot::TeamMember);
    workflows::login(&t.app, &user, &pass).await.unwrap();
}

fn ids(raw: &[&str]) -> Vec<PostId> {
    raw.iter().map(|s| PostId::from(*s)).collect()
}

#[tokio::test]
async fn test_approve_all_keeps_pending_order() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 3));
    zrmc_signed_in(&t).await;

    let outcome = workflows::approve_all(&t.app).await.unwrap();
    let batch = outcome.applied().unwrap();
    assert_eq!(batch.applied, ids(&["zp-1", "zp-2", "zp-3"]));

    let view = workflows::approval_view(&t.app).await;
    assert!(view.posts().pending().is_empty());
    let scheduled: Vec<_> = view.posts().scheduled().iter().map(|p| p.id().clone()).collect();
    assert_eq!(scheduled, ids(&["zp-1", "zp-2", "zp-3"]));
    for post in view.posts().scheduled() {
        assert_eq!(post.scheduled_at(), Some(PhysicalTime::from_ms(TEST_EPOCH_MS + DAY_MS)));
    }

    assert_eq!(t.content.save_count(), 1);
    assert_eq!(t.content.stored(ProjectId::Zrmc).len(), 3);
    assert_eq!(workflows::sync_status(&t.app).await.level, SyncLevel::Synced);
}

#[tokio::test]
async fn test_view_only_session_is_silently_refused() {
    let matrix = PermissionMatrix::builder()
        .grant_everywhere(Role::SuperAdmin, CapabilitySet::FULL)
        .grant(Role::ZrmcTeam, ProjectId::Zrmc, CapabilitySet::VIEWER)
        .build()
        .unwrap();
    let t = TestApp::with_matrix(matrix);
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 3));
    zrmc_signed_in(&t).await;
    workflows::load_posts(&t.app).await.unwrap();
    let version = t.sync.version();

    let outcome = workflows::approve_all(&t.app).await.unwrap();
    assert_matches!(outcome, Outcome::Refused(Refusal::NotPermitted { .. }));

    let single = workflows::approve_post(&t.app, &PostId::from("zp-1"), None)
        .await
        .unwrap();
    assert_matches!(single, Outcome::Refused(Refusal::NotPermitted { .. }));

    assert_eq!(workflows::approval_view(&t.app).await.posts().pending().len(), 3);
    assert_eq!(t.sync.version(), version);
    assert_eq!(t.content.save_count(), 0);

    let err = workflows::submit_post(&t.app, "hello", &[portal_app::Platform::X])
        .await
        .unwrap_err();
    assert_matches!(err, PortalError::ForbiddenAction { .. });
}

#[tokio::test]
async fn test_refusal_comes_before_loading_posts() {
    let matrix = PermissionMatrix::builder()
        .grant_everywhere(Role::SuperAdmin, CapabilitySet::FULL)
        .grant(Role::ZrmcTeam, ProjectId::Zrmc, CapabilitySet::VIEWER)
        .build()
        .unwrap();
    let t = TestApp::with_matrix(matrix);
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 3));
    zrmc_signed_in(&t).await;
    t.content.set_offline(true);
    let version = t.sync.version();

    let all = workflows::approve_all(&t.app).await.unwrap();
    assert_matches!(all, Outcome::Refused(Refusal::NotPermitted { .. }));
    let single = workflows::approve_post(&t.app, &PostId::from("zp-1"), None)
        .await
        .unwrap();
    assert_matches!(single, Outcome::Refused(Refusal::NotPermitted { .. }));
    let selected = workflows::approve_selected(&t.app, &ids(&["zp-1"]), BatchAction::Approve)
        .await
        .unwrap();
    assert_matches!(selected, Outcome::Refused(Refusal::NotPermitted { .. }));

    assert_eq!(t.sync.version(), version);
    assert_eq!(workflows::approval_view(&t.app).await.project(), None);
}

#[tokio::test]
async fn test_approve_selected_drops_unknown_ids() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 3));
    zrmc_signed_in(&t).await;

    let outcome = workflows::approve_selected(&t.app, &ids(&["zp-3", "ghost", "zp-1"]), BatchAction::Approve)
        .await
        .unwrap();
    let batch = outcome.applied().unwrap();
    assert_eq!(batch.applied, ids(&["zp-1", "zp-3"]));
    assert_eq!(batch.skipped, ids(&["ghost"]));

    let view = workflows::approval_view(&t.app).await;
    assert_eq!(view.posts().pending().len(), 1);
    assert_eq!(view.posts().scheduled().len(), 2);
}

#[tokio::test]
async fn test_strict_selection_rejects_non_pending_ids() {
    let config = AppConfig {
        approve_selected_strict: true,
        ..AppConfig::default()
    };
    let t = TestApp::with_config(config);
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 2));
    zrmc_signed_in(&t).await;

    let err = workflows::approve_selected(&t.app, &ids(&["zp-1", "ghost"]), BatchAction::Approve)
        .await
        .unwrap_err();
    assert_matches!(err, PortalError::InvalidBatchSelection { .. });
    assert_eq!(workflows::approval_view(&t.app).await.posts().pending().len(), 2);

    let err = workflows::approve_selected(&t.app, &[], BatchAction::Approve)
        .await
        .unwrap_err();
    assert_matches!(err, PortalError::InvalidBatchSelection { .. });
}

#[tokio::test]
async fn test_published_post_does_not_move() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 1));
    zrmc_signed_in(&t).await;
    let id = PostId::from("zp-1");

    workflows::approve_post(&t.app, &id, None).await.unwrap();
    t.clock.advance(1_000);
    let published = workflows::publish(&t.app, &id).await.unwrap();
    let post = published.applied().unwrap();
    assert_eq!(post.status(), PostStatus::Published);
    assert_eq!(post.published_at(), Some(PhysicalTime::from_ms(TEST_EPOCH_MS + 1_000)));
    let saves = t.content.save_count();

    for outcome in [
        workflows::publish(&t.app, &id).await.unwrap(),
        workflows::approve_post(&t.app, &id, None).await.unwrap(),
        workflows::request_edit(&t.app, &id, "again").await.unwrap(),
    ] {
        assert_matches!(
            outcome,
            Outcome::Refused(Refusal::InvalidTransition { from: PostStatus::Published, .. })
        );
    }
    assert_eq!(t.content.save_count(), saves);
    assert_eq!(workflows::approval_view(&t.app).await.posts().published().len(), 1);
}

#[tokio::test]
async fn test_request_edit_then_resubmit() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 2));
    zrmc_signed_in(&t).await;
    let id = PostId::from("zp-1");

    let outcome = workflows::request_edit(&t.app, &id, "  Shorter please ").await.unwrap();
    let post = outcome.applied().unwrap();
    assert_eq!(post.status(), PostStatus::EditRequested);
    assert_eq!(post.edit_note(), Some("Shorter please"));

    let outcome = workflows::resubmit(&t.app, &id, Some("Short copy".to_string()))
        .await
        .unwrap();
    let post = outcome.applied().unwrap();
    assert_eq!(post.status(), PostStatus::Pending);
    assert_eq!(post.body(), "Short copy");
    assert_eq!(post.edit_note(), None);

    let pending: Vec<_> = workflows::approval_view(&t.app)
        .await
        .posts()
        .pending_ids();
    assert_eq!(pending, ids(&["zp-2", "zp-1"]));
}

#[tokio::test]
async fn test_explicit_and_proposed_slots_win_over_default() {
    let t = TestApp::new();
    let proposed = PhysicalTime::from_ms(TEST_EPOCH_MS + 5 * DAY_MS);
    t.seed_posts(
        ProjectId::Zrmc,
        vec![
            PostBuilder::new("a").proposed_at(proposed).build(),
            PostBuilder::new("b").build(),
        ],
    );
    zrmc_signed_in(&t).await;

    let a = workflows::approve_post(&t.app, &PostId::from("a"), None).await.unwrap();
    assert_eq!(a.applied().unwrap().scheduled_at(), Some(proposed));

    let explicit = PhysicalTime::from_ms(TEST_EPOCH_MS + 2 * DAY_MS);
    let b = workflows::approve_post(&t.app, &PostId::from("b"), Some(explicit))
        .await
        .unwrap();
    assert_eq!(b.applied().unwrap().scheduled_at(), Some(explicit));
}

#[tokio::test]
async fn test_selection_drives_batch_and_is_cleared() {
    let t = TestApp::new();
    t.seed_posts(ProjectId::Zrmc, pending_posts("zp", 4));
    zrmc_signed_in(&t).await;
    workflows::load_posts(&t.app).await.unwrap();

    assert!(workflows::select_post(&t.app, &PostId::from("zp-4")).await);
    assert!(workflows::select_post(&t.app, &PostId::from("zp-2")).await);
    assert!(!workflows::select_post(&t.app, &PostId::from("ghost")).await);
    assert!(!workflows::toggle_post(&t.app, &PostId::from("zp-4")).await);
    assert!(workflows::toggle_post(&t.app, &PostId::from("zp-3")).await);

    let outcome = workflows::apply_to_selection(
        &t.app,
        BatchAction::RequestEdit {
            note: "Use the new logo".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.applied().unwrap().applied, ids(&["zp-2", "zp-3"]));

    let view = workflows::approval_view(&t.app).await;
    assert!(view.selection().is_empty());
    for post in view.posts().edit_requested() {
        assert_eq!(post.edit_note(), Some("Use the new logo"));
    }

    assert_eq!(workflows::select_all_pending(&t.app).await, 2);
    workflows::clear_selection(&t.app).await;
    assert!(workflows::approval_view(&t.app).await.selection().is_empty());
}

#[tokio::test]
async fn test_submitted_post_is_pending_and_authored() {
    let t = TestApp::new();
    zrmc_signed_in(&t).await;

    let post = workflows::submit_post(&t.app, "Flu shots this Friday", &[portal_app::Platform::Facebook])
        .await
        .unwrap();
    assert_eq!(post.status(), PostStatus::Pending);
    assert!(!post.created_by().is_empty());

    let stored = t.content.stored(ProjectId::Zrmc);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id(), post.id());

    let err = workflows::submit_post(&t.app, "no targets", &[]).await.unwrap_err();
    assert_matches!(err, PortalError::Invalid { .. });
}
