//! Session persistence under two fixed storage keys.
//!
//! Values are written as JSON. A value that no longer parses (schema drift,
//! manual edits) is treated as absent so a bad cache never locks anyone out.

use super::context::SessionContext;
use portal_authentication::Principal;
use portal_authorization::ProjectId;
use portal_core::{PortalError, StorageEffects, StorageJsonExt};
use tracing::{debug, warn};

/// Key holding the signed-in principal.
pub const PRINCIPAL_KEY: &str = "portal.session.principal";

/// Key holding the selected project id.
pub const PROJECT_KEY: &str = "portal.session.project";

/// Raw persisted values, before re-validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    /// Cached principal
    pub principal: Option<Principal>,
    /// Cached project selection
    pub project: Option<ProjectId>,
}

impl StoredSession {
    /// Turn the stored values into a live session, re-validating the project.
    pub fn into_context(self, signed_out: SessionContext) -> SessionContext {
        match self.principal {
            Some(principal) => SessionContext::restored(
                signed_out.matrix().clone(),
                principal,
                self.project,
            ),
            None => signed_out,
        }
    }
}

/// Write both keys, removing the project key when nothing is selected.
pub async fn save_session(
    storage: &dyn StorageEffects,
    session: &SessionContext,
) -> Result<(), PortalError> {
    let Some(principal) = session.principal() else {
        return clear_session(storage).await;
    };
    storage.store_json(PRINCIPAL_KEY, principal).await?;
    match session.selected_project() {
        Some(project) => storage.store_json(PROJECT_KEY, &project).await?,
        None => {
            storage.remove(PROJECT_KEY).await?;
        }
    }
    Ok(())
}

/// Write only the project selection.
pub async fn save_project(
    storage: &dyn StorageEffects,
    project: ProjectId,
) -> Result<(), PortalError> {
    storage.store_json(PROJECT_KEY, &project).await
}

/// Remove both keys.
pub async fn clear_session(storage: &dyn StorageEffects) -> Result<(), PortalError> {
    storage.remove(PRINCIPAL_KEY).await?;
    storage.remove(PROJECT_KEY).await?;
    Ok(())
}

/// Read both keys. Unreadable values come back as `None`.
pub async fn load_session(storage: &dyn StorageEffects) -> Result<StoredSession, PortalError> {
    let principal = lenient::<Principal>(storage, PRINCIPAL_KEY).await?;
    let project = lenient::<ProjectId>(storage, PROJECT_KEY).await?;
    debug!(
        has_principal = principal.is_some(),
        project = ?project,
        "Loaded stored session"
    );
    Ok(StoredSession { principal, project })
}

async fn lenient<T>(storage: &dyn StorageEffects, key: &str) -> Result<Option<T>, PortalError>
where
    T: serde::de::DeserializeOwned + Send,
{
    match storage.retrieve_json::<T>(key).await {
        Ok(value) => Ok(value),
        Err(PortalError::Serialization { message }) => {
            warn!(key, %message, "Ignoring unreadable session value");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
