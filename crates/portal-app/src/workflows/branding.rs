//! Branding Workflow - per-project rebranding
//!
//! Overrides are sparse patches merged over the static project defaults at
//! read time. Writes need `manage_branding` in the target project and are
//! refused with [`PortalError::ForbiddenAction`] otherwise.

use crate::core::{branding_key, AppCore};
use crate::sync::SyncLevel;
use async_lock::RwLock;
use portal_authorization::{BrandingOverride, Capability, Project, ProjectId};
use portal_core::{PortalError, StorageJsonExt};
use std::sync::Arc;
use tracing::{info, warn};

/// The project as currently branded: defaults with any override applied.
pub async fn effective_project(app_core: &Arc<RwLock<AppCore>>, project: ProjectId) -> Project {
    let core = app_core.read().await;
    effective(&core, project)
}

/// Effective branding of every project the signed-in principal can view.
pub async fn accessible_projects_branded(app_core: &Arc<RwLock<AppCore>>) -> Vec<Project> {
    let core = app_core.read().await;
    core.session()
        .accessible_projects()
        .into_iter()
        .map(|project| effective(&core, project))
        .collect()
}

/// Patch a project's branding
///
/// **What it does**: Layers `patch` over the stored override field by field
/// and persists the result
/// **Returns**: The effectively branded project
/// **Signal pattern**: Replaces the branding overrides; reports sync status
///
/// A failed write keeps the new branding in memory and reports `error`.
pub async fn update_branding(
    app_core: &Arc<RwLock<AppCore>>,
    project: ProjectId,
    patch: &BrandingOverride,
) -> Result<Project, PortalError> {
    let core = app_core.read().await;
    core.session()
        .require_in(project, Capability::ManageBranding)?;
    patch.validate()?;
    if patch.is_empty() {
        return Ok(effective(&core, project));
    }

    let merged = core.branding_signal().transact(|current| {
        let mut next = current.clone();
        let merged = {
            let entry = next.entry(project).or_default();
            entry.layer(patch);
            entry.clone()
        };
        (Some(next), merged)
    });

    match core.storage().store_json(&branding_key(project), &merged).await {
        Ok(()) => {
            core.report_sync(SyncLevel::Synced, None).await;
            info!(%project, "Branding updated");
        }
        Err(e) => {
            warn!(%project, error = %e, "Failed to persist branding");
            core.report_sync(SyncLevel::Error, Some(format!("Branding not saved: {e}")))
                .await;
        }
    }
    Ok(effective(&core, project))
}

/// Drop a project's override
///
/// **What it does**: Restores the static defaults and removes the stored
/// override
/// **Returns**: The project's defaults
/// **Signal pattern**: Replaces the branding overrides; reports sync status
pub async fn clear_branding(
    app_core: &Arc<RwLock<AppCore>>,
    project: ProjectId,
) -> Result<Project, PortalError> {
    let core = app_core.read().await;
    core.session()
        .require_in(project, Capability::ManageBranding)?;

    let had_override = core.branding_signal().transact(|current| {
        if !current.contains_key(&project) {
            return (None, false);
        }
        let mut next = current.clone();
        next.remove(&project);
        (Some(next), true)
    });

    match core.storage().remove(&branding_key(project)).await {
        Ok(existed) if had_override || existed => {
            core.report_sync(SyncLevel::Synced, None).await;
            info!(%project, "Branding reset to defaults");
        }
        Ok(_) => {}
        Err(e) => {
            warn!(%project, error = %e, "Failed to remove stored branding");
            core.report_sync(SyncLevel::Error, Some(format!("Branding not saved: {e}")))
                .await;
        }
    }
    Ok(core.registry().get(project).clone())
}

fn effective(core: &AppCore, project: ProjectId) -> Project {
    let defaults = core.registry().get(project);
    core.branding_signal().with(|overrides| match overrides.get(&project) {
        Some(patch) => patch.apply_to(defaults),
        None => defaults.clone(),
    })
}
