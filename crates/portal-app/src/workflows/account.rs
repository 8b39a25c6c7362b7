//! Account Workflow - sign in, sign out, project switching
//!
//! Session changes are written through to storage so a restart (or another
//! process sharing the store) picks them up. A failed write is logged and
//! does not undo the in-memory change.

use crate::core::AppCore;
use crate::session::{self, SessionContext};
use async_lock::RwLock;
use portal_authorization::ProjectId;
use portal_core::PortalError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sign in with a username/password pair
///
/// **What it does**: Verifies credentials, selects the default project,
/// persists the session
/// **Returns**: The new session
/// **Signal pattern**: Replaces the session value; clears the approval view
///
/// Failures return [`PortalError::InvalidCredentials`] whichever half was
/// wrong. Neither half is ever logged on failure.
pub async fn login(
    app_core: &Arc<RwLock<AppCore>>,
    username: &str,
    password: &str,
) -> Result<SessionContext, PortalError> {
    let core = app_core.read().await;

    let principal = match core.resolver().authenticate(username, password).await {
        Ok(principal) => principal,
        Err(e) => {
            info!("Login rejected");
            return Err(e.into());
        }
    };
    debug!(username, "Credentials accepted");

    let session = SessionContext::signed_in(core.matrix().clone(), principal);
    core.install_session(session.clone());

    if let Err(e) = session::save_session(core.storage().as_ref(), &session).await {
        warn!(error = %e, "Failed to persist session");
    }

    if let Some(principal) = session.principal() {
        info!(
            principal = %principal.id,
            role = %principal.role,
            project = ?session.selected_project(),
            "Signed in"
        );
    }
    Ok(session)
}

/// Sign out
///
/// **What it does**: Drops the principal and clears the persisted session
/// **Returns**: Unit result
/// **Signal pattern**: Replaces the session value; clears the approval view
pub async fn logout(app_core: &Arc<RwLock<AppCore>>) -> Result<(), PortalError> {
    let core = app_core.read().await;
    let previous = core.session();
    core.install_session(SessionContext::new(core.matrix().clone()));
    session::clear_session(core.storage().as_ref()).await?;

    if let Some(principal) = previous.principal() {
        info!(principal = %principal.id, "Signed out");
    }
    Ok(())
}

/// Restore a persisted session at startup
///
/// **What it does**: Re-reads session, branding and sync status from storage,
/// re-validating the stored project
/// **Returns**: The restored session (signed out if nothing was stored)
/// **Signal pattern**: Replaces session, branding and sync status values
pub async fn rehydrate(app_core: &Arc<RwLock<AppCore>>) -> Result<SessionContext, PortalError> {
    let core = app_core.read().await;
    core.rehydrate().await
}

/// Switch the selected project
///
/// **What it does**: Selects `project` if the principal's role can view it
/// **Returns**: [`PortalError::ProjectNotAccessible`] otherwise, leaving the
/// selection unchanged
/// **Signal pattern**: Replaces the session value; clears the approval view
/// when the project changes
pub async fn select_project(
    app_core: &Arc<RwLock<AppCore>>,
    project: ProjectId,
) -> Result<(), PortalError> {
    let core = app_core.read().await;
    let mut session = core.session();
    if session.selected_project() == Some(project) {
        return Ok(());
    }
    session.select_project(project)?;
    core.install_session(session);

    if let Err(e) = session::save_project(core.storage().as_ref(), project).await {
        warn!(%project, error = %e, "Failed to persist project selection");
    }
    info!(%project, "Switched project");
    Ok(())
}

/// Snapshot of the current session.
pub async fn current_session(app_core: &Arc<RwLock<AppCore>>) -> SessionContext {
    app_core.read().await.session()
}

/// Projects the signed-in principal can view, in declaration order.
pub async fn accessible_projects(app_core: &Arc<RwLock<AppCore>>) -> Vec<ProjectId> {
    app_core.read().await.session().accessible_projects()
}
