//! Approval Workflow - post lifecycle against the selected project
//!
//! Every mutation follows the same shape:
//! 1. Make sure the approval view holds the selected project's posts
//! 2. Run the engine step and install the replacement state in one write
//! 3. If posts changed, persist them and report through sync status
//!
//! The capability check runs before step 1, so a session that may not act
//! never triggers a load. A refused step (missing capability, wrong status)
//! changes nothing and reports nothing. If the selected project changes
//! while posts load, the operation fails instead of touching the other
//! project's posts.

use crate::approval::{
    ApprovalEngine, ApprovalView, BatchAction, BatchOutcome, Outcome, Platform, Post, PostId,
    PostsState, Refusal, Step,
};
use crate::core::{posts_cache_key, project_changed, AppCore};
use crate::sync::SyncLevel;
use async_lock::RwLock;
use portal_authorization::{Capability, ProjectId};
use portal_core::{PhysicalTime, PortalError, StorageJsonExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Load the selected project's posts
///
/// **What it does**: Reads posts from the content store into the approval
/// view and refreshes the local cache
/// **Returns**: The loaded posts
/// **Signal pattern**: Replaces the approval view
///
/// When the content store fails, the local cache is used instead and sync
/// status reports `local-only`. With no cache either, reports `error` and
/// returns the content store's error.
pub async fn load_posts(app_core: &Arc<RwLock<AppCore>>) -> Result<PostsState, PortalError> {
    let core = app_core.read().await;
    let project = selected_project(&core)?;

    let posts = match core.content_store().load_posts(project).await {
        Ok(posts) => {
            if let Err(e) = core
                .storage()
                .store_json(&posts_cache_key(project), &posts)
                .await
            {
                warn!(%project, error = %e, "Failed to refresh post cache");
            }
            posts
        }
        Err(remote) => {
            warn!(%project, error = %remote, "Content store read failed");
            match core.read_posts_cache(project).await {
                Ok(Some(cached)) => {
                    core.report_sync(
                        SyncLevel::LocalOnly,
                        Some(format!("Showing cached posts; content store unavailable: {remote}")),
                    )
                    .await;
                    cached
                }
                _ => {
                    core.report_sync(
                        SyncLevel::Error,
                        Some(format!("Posts unavailable: {remote}")),
                    )
                    .await;
                    return Err(remote);
                }
            }
        }
    };

    let state = PostsState::from_posts(posts);
    let installed = core.approval_signal().transact(|_| {
        if core.session().selected_project() == Some(project) {
            (Some(ApprovalView::loaded(project, state.clone())), true)
        } else {
            (None, false)
        }
    });
    if !installed {
        return Err(project_changed(project));
    }
    Ok(state)
}

/// Snapshot of the approval view.
pub async fn approval_view(app_core: &Arc<RwLock<AppCore>>) -> ApprovalView {
    app_core.read().await.approval_view()
}

/// Add a new pending post
///
/// **What it does**: Creates a pending post authored by the signed-in
/// principal
/// **Returns**: The post, or [`PortalError::ForbiddenAction`] without `edit`
/// **Signal pattern**: Replaces the approval view; reports sync status
pub async fn submit_post(
    app_core: &Arc<RwLock<AppCore>>,
    body: &str,
    platforms: &[Platform],
) -> Result<Post, PortalError> {
    let session = app_core.read().await.session();
    session.require(Capability::Edit)?;
    let author = session
        .principal()
        .map(|p| p.display_name.clone())
        .unwrap_or_default();
    let post = Post::new(PostId::generate(), body, platforms.iter().copied(), author)?;

    let project = ensure_loaded(app_core).await?;
    let core = app_core.read().await;
    let (_, persist) = core.apply_step(project, false, |session, posts| {
        session.require(Capability::Edit)?;
        let mut all = posts.to_vec();
        all.push(post.clone());
        Ok(Step::applied(PostsState::from_posts(all), ()))
    })?;
    if let Some(posts) = persist {
        core.persist_posts(project, &posts).await;
    }
    info!(%project, post = %post.id(), "Submitted post");
    Ok(post)
}

/// Approve one pending or edit-requested post
///
/// **What it does**: Moves the post to scheduled at `schedule_at`, the slot
/// proposed on the post, or the configured default offset from now
/// **Returns**: The scheduled post, or why nothing happened
/// **Signal pattern**: Replaces the approval view; reports sync status
pub async fn approve_post(
    app_core: &Arc<RwLock<AppCore>>,
    id: &PostId,
    schedule_at: Option<PhysicalTime>,
) -> Result<Outcome<Post>, PortalError> {
    if let Some(refusal) = refused_before_load(app_core, "approve").await {
        return Ok(Outcome::Refused(refusal));
    }
    let project = ensure_loaded(app_core).await?;
    let core = app_core.read().await;
    let (engine, now) = (core.engine(), core.now()?);
    let (outcome, persist) = core.apply_step(project, false, |session, posts| {
        Ok(engine.approve(session, posts, id, schedule_at, now))
    })?;
    finish(&core, project, outcome, persist).await
}

/// Send one pending post back to the content team
///
/// **What it does**: Moves the post to edit-requested with `note`
/// **Returns**: The updated post, or why nothing happened
/// **Signal pattern**: Replaces the approval view; reports sync status
pub async fn request_edit(
    app_core: &Arc<RwLock<AppCore>>,
    id: &PostId,
    note: &str,
) -> Result<Outcome<Post>, PortalError> {
    if let Some(refusal) = refused_before_load(app_core, "request_edit").await {
        return Ok(Outcome::Refused(refusal));
    }
    let project = ensure_loaded(app_core).await?;
    let core = app_core.read().await;
    let engine = core.engine();
    let (outcome, persist) = core.apply_step(project, false, |session, posts| {
        Ok(engine.request_edit(session, posts, id, note))
    })?;
    finish(&core, project, outcome, persist).await
}

/// Return an edit-requested post to review
///
/// **What it does**: Moves the post back to pending, clearing the note and
/// optionally replacing the body
/// **Returns**: The updated post, or why nothing happened
/// **Signal pattern**: Replaces the approval view; reports sync status
pub async fn resubmit(
    app_core: &Arc<RwLock<AppCore>>,
    id: &PostId,
    revised_body: Option<String>,
) -> Result<Outcome<Post>, PortalError> {
    if let Some(refusal) = refused_before_load(app_core, "resubmit").await {
        return Ok(Outcome::Refused(refusal));
    }
    let project = ensure_loaded(app_core).await?;
    let core = app_core.read().await;
    let engine = core.engine();
    let (outcome, persist) = core.apply_step(project, false, |session, posts| {
        Ok(engine.resubmit(session, posts, id, revised_body))
    })?;
    finish(&core, project, outcome, persist).await
}

/// Publish a scheduled post
///
/// **What it does**: Stamps the post with the current time; it is immutable
/// afterwards
/// **Returns**: The published post, or why nothing happened
/// **Signal pattern**: Replaces the approval view; reports sync status
pub async fn publish(
    app_core: &Arc<RwLock<AppCore>>,
    id: &PostId,
) -> Result<Outcome<Post>, PortalError> {
    if let Some(refusal) = refused_before_load(app_core, "publish").await {
        return Ok(Outcome::Refused(refusal));
    }
    let project = ensure_loaded(app_core).await?;
    let core = app_core.read().await;
    let (engine, now) = (core.engine(), core.now()?);
    let (outcome, persist) = core.apply_step(project, false, |session, posts| {
        Ok(engine.publish(session, posts, id, now))
    })?;
    finish(&core, project, outcome, persist).await
}

/// Approve every pending post
///
/// **What it does**: Schedules the whole pending set in one replacement
/// **Returns**: Ids moved, or why nothing happened
/// **Signal pattern**: Replaces the approval view and clears the selection;
/// reports sync status only if posts changed
pub async fn approve_all(
    app_core: &Arc<RwLock<AppCore>>,
) -> Result<Outcome<BatchOutcome>, PortalError> {
    if let Some(refusal) = refused_before_load(app_core, "approve_all").await {
        return Ok(Outcome::Refused(refusal));
    }
    let project = ensure_loaded(app_core).await?;
    let core = app_core.read().await;
    let (engine, now) = (core.engine(), core.now()?);
    let (outcome, persist) = core.apply_step(project, true, |session, posts| {
        Ok(engine.approve_all(session, posts, now))
    })?;
    finish_batch(&core, project, "approve_all", outcome, persist).await
}

/// Apply `action` to the pending posts named by `ids`
///
/// **What it does**: Approves or requests edits on the named posts in
/// collection order
/// **Returns**: Ids moved and ids skipped, or why nothing happened.
/// [`PortalError::InvalidBatchSelection`] for an empty `ids`, or in strict
/// mode for ids that are not pending
/// **Signal pattern**: Replaces the approval view and clears the selection;
/// reports sync status only if posts changed
pub async fn approve_selected(
    app_core: &Arc<RwLock<AppCore>>,
    ids: &[PostId],
    action: BatchAction,
) -> Result<Outcome<BatchOutcome>, PortalError> {
    if let Some(refusal) = refused_before_load(app_core, action.selected_name()).await {
        return Ok(Outcome::Refused(refusal));
    }
    let project = ensure_loaded(app_core).await?;
    let core = app_core.read().await;
    let (engine, now) = (core.engine(), core.now()?);
    let (outcome, persist) = core.apply_step(project, true, |session, posts| {
        engine
            .apply_selected(session, posts, ids, &action, now)
            .map_err(PortalError::from)
    })?;
    finish_batch(&core, project, action.selected_name(), outcome, persist).await
}

/// Request edits on the pending posts named by `ids` with one shared note.
pub async fn request_edit_selected(
    app_core: &Arc<RwLock<AppCore>>,
    ids: &[PostId],
    note: &str,
) -> Result<Outcome<BatchOutcome>, PortalError> {
    approve_selected(
        app_core,
        ids,
        BatchAction::RequestEdit {
            note: note.to_string(),
        },
    )
    .await
}

/// Apply `action` to the current selection.
pub async fn apply_to_selection(
    app_core: &Arc<RwLock<AppCore>>,
    action: BatchAction,
) -> Result<Outcome<BatchOutcome>, PortalError> {
    let ids = app_core.read().await.approval_view().selected_ids();
    approve_selected(app_core, &ids, action).await
}

/// Add a pending post to the selection; false if not pending or already
/// selected.
pub async fn select_post(app_core: &Arc<RwLock<AppCore>>, id: &PostId) -> bool {
    let core = app_core.read().await;
    core.approval_signal().transact(|view| match view.selecting(id) {
        Some(next) => (Some(next), true),
        None => (None, false),
    })
}

/// Remove a post from the selection; false if it was not selected.
pub async fn deselect_post(app_core: &Arc<RwLock<AppCore>>, id: &PostId) -> bool {
    let core = app_core.read().await;
    core.approval_signal().transact(|view| match view.deselecting(id) {
        Some(next) => (Some(next), true),
        None => (None, false),
    })
}

/// Flip a post's selection; returns whether it is selected afterwards.
pub async fn toggle_post(app_core: &Arc<RwLock<AppCore>>, id: &PostId) -> bool {
    let core = app_core.read().await;
    core.approval_signal().transact(|view| {
        if let Some(next) = view.deselecting(id) {
            (Some(next), false)
        } else if let Some(next) = view.selecting(id) {
            (Some(next), true)
        } else {
            (None, false)
        }
    })
}

/// Select every pending post; returns how many are selected.
pub async fn select_all_pending(app_core: &Arc<RwLock<AppCore>>) -> usize {
    let core = app_core.read().await;
    core.approval_signal().transact(|view| {
        let next = view.selecting_all_pending();
        let count = next.selection().len();
        (Some(next), count)
    })
}

/// Empty the selection.
pub async fn clear_selection(app_core: &Arc<RwLock<AppCore>>) {
    let core = app_core.read().await;
    core.approval_signal()
        .transact(|view| (view.clearing_selection(), ()));
}

fn selected_project(core: &AppCore) -> Result<ProjectId, PortalError> {
    core.session()
        .selected_project()
        .ok_or_else(|| PortalError::invalid("no project selected"))
}

/// Refusal for a session that may not run `action`, decided before any
/// posts are loaded.
async fn refused_before_load(app_core: &Arc<RwLock<AppCore>>, action: &str) -> Option<Refusal> {
    let session = app_core.read().await.session();
    ApprovalEngine::check_permission(&session, action)
}

/// Selected project, loading its posts first if the view holds another.
async fn ensure_loaded(app_core: &Arc<RwLock<AppCore>>) -> Result<ProjectId, PortalError> {
    let (project, loaded) = {
        let core = app_core.read().await;
        let project = selected_project(&core)?;
        (project, core.approval_view().project() == Some(project))
    };
    if !loaded {
        load_posts(app_core).await?;
    }
    Ok(project)
}

async fn finish<T>(
    core: &AppCore,
    project: ProjectId,
    outcome: Outcome<T>,
    persist: Option<Vec<Post>>,
) -> Result<Outcome<T>, PortalError> {
    if let Some(posts) = persist {
        core.persist_posts(project, &posts).await;
    }
    Ok(outcome)
}

async fn finish_batch(
    core: &AppCore,
    project: ProjectId,
    label: &str,
    outcome: Outcome<BatchOutcome>,
    persist: Option<Vec<Post>>,
) -> Result<Outcome<BatchOutcome>, PortalError> {
    if let Outcome::Applied(batch) = &outcome {
        info!(
            %project,
            action = label,
            applied = batch.applied.len(),
            skipped = batch.skipped.len(),
            "Batch complete"
        );
    }
    finish(core, project, outcome, persist).await
}
