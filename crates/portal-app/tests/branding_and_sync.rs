//! Rebranding permissions and the shared sync indicator.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use portal_app::{core::branding_key, workflows, SyncLevel};
use portal_authorization::{BrandingOverride, Color, CredentialSlot, ProjectId, ProjectRegistry};
use portal_core::PortalError;
use portal_testkit::{project_login, TestApp, SUPER_ADMIN};

fn rename(name: &str) -> BrandingOverride {
    BrandingOverride {
        name: Some(name.to_string()),
        ..BrandingOverride::default()
    }
}

#[tokio::test]
async fn test_super_admin_rebrands_and_clears() {
    let t = TestApp::new();
    workflows::login(&t.app, SUPER_ADMIN.0, SUPER_ADMIN.1)
        .await
        .unwrap();
    let defaults = ProjectRegistry::global().get(ProjectId::Tvh).clone();

    let project = workflows::update_branding(&t.app, ProjectId::Tvh, &rename("Teton Health"))
        .await
        .unwrap();
    assert_eq!(project.name, "Teton Health");
    assert_eq!(project.logo, defaults.logo);

    let mut recolor = BrandingOverride::default();
    recolor.colors.accent = Some(Color::parse("#ff8800").unwrap());
    let project = workflows::update_branding(&t.app, ProjectId::Tvh, &recolor)
        .await
        .unwrap();
    assert_eq!(project.name, "Teton Health");
    assert_eq!(project.colors.accent.as_str(), "#FF8800");
    assert_eq!(workflows::sync_status(&t.app).await.level, SyncLevel::Synced);

    let restored = workflows::clear_branding(&t.app, ProjectId::Tvh).await.unwrap();
    assert_eq!(restored, defaults);
    assert_eq!(workflows::effective_project(&t.app, ProjectId::Tvh).await, defaults);
}

#[tokio::test]
async fn test_team_role_cannot_rebrand() {
    let t = TestApp::new();
    let (user, pass) = project_login(ProjectId::Zrmc, CredentialSlot::Administrator);
    workflows::login(&t.app, &user, &pass).await.unwrap();
    let version = t.sync.version();

    let err = workflows::update_branding(&t.app, ProjectId::Zrmc, &rename("ZRMC"))
        .await
        .unwrap_err();
    assert_matches!(err, PortalError::ForbiddenAction { .. });

    let err = workflows::clear_branding(&t.app, ProjectId::Zrmc).await.unwrap_err();
    assert_matches!(err, PortalError::ForbiddenAction { .. });
    assert_eq!(t.sync.version(), version);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let t = TestApp::new();
    workflows::login(&t.app, SUPER_ADMIN.0, SUPER_ADMIN.1)
        .await
        .unwrap();

    let err = workflows::update_branding(&t.app, ProjectId::Sbh, &rename("   "))
        .await
        .unwrap_err();
    assert_matches!(err, PortalError::Invalid { .. });
}

#[tokio::test]
async fn test_branding_reaches_other_instances() {
    let t = TestApp::new();
    workflows::login(&t.app, SUPER_ADMIN.0, SUPER_ADMIN.1)
        .await
        .unwrap();
    let other = t.sibling();
    workflows::rehydrate(&other.app).await.unwrap();

    workflows::update_branding(&t.app, ProjectId::Sbh, &rename("Summit"))
        .await
        .unwrap();
    workflows::on_storage_changed(&other.app, &branding_key(ProjectId::Sbh))
        .await
        .unwrap();

    let branded = workflows::accessible_projects_branded(&other.app).await;
    let sbh = branded.iter().find(|p| p.id == ProjectId::Sbh).unwrap();
    assert_eq!(sbh.name, "Summit");

    let fresh = t.sibling();
    workflows::rehydrate(&fresh.app).await.unwrap();
    assert_eq!(
        workflows::effective_project(&fresh.app, ProjectId::Sbh).await.name,
        "Summit"
    );
}

#[tokio::test]
async fn test_repeated_report_keeps_value() {
    let t = TestApp::new();
    let first = t.sync.report(SyncLevel::LocalOnly, Some("offline".to_string()));
    t.clock.advance(10);
    let second = t.sync.report(SyncLevel::LocalOnly, Some("offline".to_string()));

    assert!(first.same_as(&second));
    assert_ne!(first.updated_at, second.updated_at);
    assert!(t.sync.current_status().same_as(&first));
}

#[tokio::test]
async fn test_listeners_see_reports_in_order() {
    let t = TestApp::new();
    let mut rx = workflows::listen_sync_status(&t.app).await;
    let mut poll = workflows::subscribe_sync_status(&t.app).await;

    t.sync.report(SyncLevel::Synced, None);
    t.sync.report(SyncLevel::Error, Some("disk full".to_string()));

    assert_eq!(rx.recv().await.unwrap().level, SyncLevel::Synced);
    assert_eq!(rx.recv().await.unwrap().level, SyncLevel::Error);
    assert_eq!(poll.poll().unwrap().level, SyncLevel::Error);
    assert!(poll.poll().is_none());
}
