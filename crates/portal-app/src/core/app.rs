//! AppCore: injected handlers plus the reactive state every frontend reads.

use crate::approval::{ApprovalEngine, ApprovalView, Outcome, Post, PostsState, Step};
use crate::config::{AppConfig, CredentialsConfig};
use crate::content::{ContentStore, StorageContentStore};
use crate::session::{self, SessionContext, PRINCIPAL_KEY, PROJECT_KEY};
use crate::sync::{SyncLevel, SyncStatus, SyncStatusBroadcaster, SYNC_STATUS_KEY};
use portal_authentication::{CredentialResolver, HashedCredentialTable, StaticCredentialTable};
use portal_authorization::{BrandingOverride, PermissionMatrix, ProjectId, ProjectRegistry};
use portal_core::{
    Dynamic, PhysicalTime, PhysicalTimeEffects, PortalError, StorageEffects, StorageJsonExt,
};
use portal_effects::{FilesystemStorageHandler, MemoryStorageHandler, SystemTimeHandler};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prefix of per-project branding override keys.
pub const BRANDING_KEY_PREFIX: &str = "portal.branding.";

/// Prefix of the local post caches.
pub const POSTS_CACHE_KEY_PREFIX: &str = "portal.posts.";

/// Key of the branding override of `project`.
pub fn branding_key(project: ProjectId) -> String {
    format!("{BRANDING_KEY_PREFIX}{project}")
}

/// Key of the local post cache of `project`.
pub fn posts_cache_key(project: ProjectId) -> String {
    format!("{POSTS_CACHE_KEY_PREFIX}{project}")
}

/// Branding overrides by project.
pub type BrandingOverrides = BTreeMap<ProjectId, BrandingOverride>;

/// The portal application core.
///
/// Holds the effect handlers (storage, clock, credential resolver, content
/// store) and three reactive values: the session, the approval view of the
/// selected project, and the branding overrides. Frontends wrap it in
/// `Arc<RwLock<AppCore>>` and drive it through [`crate::workflows`].
pub struct AppCore {
    config: AppConfig,
    registry: &'static ProjectRegistry,
    matrix: Arc<PermissionMatrix>,
    resolver: Arc<dyn CredentialResolver>,
    storage: Arc<dyn StorageEffects>,
    content: Arc<dyn ContentStore>,
    clock: Arc<dyn PhysicalTimeEffects>,
    sync: SyncStatusBroadcaster,
    engine: ApprovalEngine,
    session: Dynamic<SessionContext>,
    approval: Dynamic<ApprovalView>,
    branding: Dynamic<BrandingOverrides>,
}

impl AppCore {
    /// Build from configuration with production handlers.
    ///
    /// Storage lives under `storage_dir` when set, in memory otherwise; the
    /// content store shares it. Credentials come from the configured backend.
    pub fn new(config: AppConfig) -> Result<Self, PortalError> {
        let storage: Arc<dyn StorageEffects> = match &config.storage_dir {
            Some(dir) => Arc::new(FilesystemStorageHandler::new(dir.clone())),
            None => Arc::new(MemoryStorageHandler::new()),
        };
        let resolver: Arc<dyn CredentialResolver> = match &config.credentials {
            CredentialsConfig::Static => Arc::new(StaticCredentialTable::builtin()),
            CredentialsConfig::Hashed { path } => Arc::new(HashedCredentialTable::load(path)?),
        };
        let clock: Arc<dyn PhysicalTimeEffects> = Arc::new(SystemTimeHandler::new());
        let matrix = Arc::new(PermissionMatrix::standard());

        Ok(Self {
            registry: ProjectRegistry::global(),
            resolver,
            content: Arc::new(StorageContentStore::new(storage.clone())),
            storage,
            sync: SyncStatusBroadcaster::new(clock.clone(), config.sync_channel_capacity),
            clock,
            engine: ApprovalEngine::new(
                config.default_schedule_offset_ms,
                config.approve_selected_strict,
            ),
            session: Dynamic::new(SessionContext::new(matrix.clone())),
            approval: Dynamic::new(ApprovalView::default()),
            branding: Dynamic::new(BrandingOverrides::new()),
            matrix,
            config,
        })
    }

    /// Replace the key-value store. The content store is left alone.
    pub fn with_storage(mut self, storage: Arc<dyn StorageEffects>) -> Self {
        self.storage = storage;
        self
    }

    /// Replace the content store.
    pub fn with_content_store(mut self, content: Arc<dyn ContentStore>) -> Self {
        self.content = content;
        self
    }

    /// Replace the credential resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the clock.
    ///
    /// The sync broadcaster is rebuilt to stamp with the new clock; call
    /// [`AppCore::with_sync`] afterwards to share an existing broadcaster.
    pub fn with_clock(mut self, clock: Arc<dyn PhysicalTimeEffects>) -> Self {
        self.sync = SyncStatusBroadcaster::new(clock.clone(), self.config.sync_channel_capacity);
        self.clock = clock;
        self
    }

    /// Report through `sync`, e.g. the process-wide broadcaster.
    pub fn with_sync(mut self, sync: SyncStatusBroadcaster) -> Self {
        self.sync = sync;
        self
    }

    /// Replace the permission matrix. Signs out.
    pub fn with_matrix(mut self, matrix: PermissionMatrix) -> Self {
        self.matrix = Arc::new(matrix);
        self.session = Dynamic::new(SessionContext::new(self.matrix.clone()));
        self
    }

    /// Configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Project catalog
    pub fn registry(&self) -> &'static ProjectRegistry {
        self.registry
    }

    /// Permission matrix
    pub fn matrix(&self) -> &Arc<PermissionMatrix> {
        &self.matrix
    }

    /// Credential resolver
    pub fn resolver(&self) -> &Arc<dyn CredentialResolver> {
        &self.resolver
    }

    /// Key-value store
    pub fn storage(&self) -> &Arc<dyn StorageEffects> {
        &self.storage
    }

    /// Content store
    pub fn content_store(&self) -> &Arc<dyn ContentStore> {
        &self.content
    }

    /// Sync status broadcaster
    pub fn sync(&self) -> &SyncStatusBroadcaster {
        &self.sync
    }

    /// Lifecycle rules
    pub fn engine(&self) -> ApprovalEngine {
        self.engine
    }

    /// Snapshot of the session.
    pub fn session(&self) -> SessionContext {
        self.session.get()
    }

    /// Reactive session value.
    pub fn session_signal(&self) -> &Dynamic<SessionContext> {
        &self.session
    }

    /// Snapshot of the approval view.
    pub fn approval_view(&self) -> ApprovalView {
        self.approval.get()
    }

    /// Reactive approval view.
    pub fn approval_signal(&self) -> &Dynamic<ApprovalView> {
        &self.approval
    }

    /// Snapshot of the branding overrides.
    pub fn branding_overrides(&self) -> BrandingOverrides {
        self.branding.get()
    }

    /// Reactive branding overrides.
    pub fn branding_signal(&self) -> &Dynamic<BrandingOverrides> {
        &self.branding
    }

    /// Current wall-clock time.
    pub fn now(&self) -> Result<PhysicalTime, PortalError> {
        self.clock
            .physical_time()
            .map_err(|e| PortalError::internal(e.to_string()))
    }

    /// Restore session, branding and sync status from storage.
    ///
    /// A stored project the role can no longer view is replaced by the
    /// default project, and the correction is written back.
    pub async fn rehydrate(&self) -> Result<SessionContext, PortalError> {
        let stored = session::load_session(self.storage.as_ref()).await?;
        let stored_project = stored.project;
        let restored = stored.into_context(SessionContext::new(self.matrix.clone()));

        if restored.is_authenticated() && restored.selected_project() != stored_project {
            if let Some(project) = restored.selected_project() {
                info!(%project, "Stored project no longer accessible, reselected");
                if let Err(e) = session::save_project(self.storage.as_ref(), project).await {
                    warn!(error = %e, "Failed to persist corrected project");
                }
            }
        }
        self.install_session(restored.clone());

        self.reload_branding().await?;
        self.reload_sync_status().await?;
        debug!(
            authenticated = restored.is_authenticated(),
            project = ?restored.selected_project(),
            "Rehydrated"
        );
        Ok(restored)
    }

    /// React to `key` having been written by another process: re-read the
    /// affected value and replace the local view of it wholesale.
    pub async fn on_storage_changed(&self, key: &str) -> Result<(), PortalError> {
        if key == PRINCIPAL_KEY || key == PROJECT_KEY {
            let stored = session::load_session(self.storage.as_ref()).await?;
            self.install_session(stored.into_context(SessionContext::new(self.matrix.clone())));
        } else if key == SYNC_STATUS_KEY {
            self.reload_sync_status().await?;
        } else if let Some(project) = project_suffix(key, BRANDING_KEY_PREFIX) {
            self.reload_branding_of(project).await?;
        } else if let Some(project) = project_suffix(key, POSTS_CACHE_KEY_PREFIX) {
            if self.approval.with(|v| v.project()) == Some(project) {
                let cached = self.read_posts_cache(project).await?.unwrap_or_default();
                self.approval
                    .update(|view| view.with_posts(PostsState::from_posts(cached)));
            }
        } else {
            debug!(key, "Ignoring storage change");
            return Ok(());
        }
        debug!(key, "Reloaded after storage change");
        Ok(())
    }

    /// Install `session`, dropping the approval view if it belongs to a
    /// project other than the newly selected one.
    pub(crate) fn install_session(&self, session: SessionContext) {
        let selected = session.selected_project();
        self.session.set(session);
        if self.approval.with(|v| v.project()).is_some_and(|p| Some(p) != selected) {
            self.approval.set(ApprovalView::default());
        }
    }

    /// Run an engine step against the approval view of `project` and install
    /// its result.
    ///
    /// The step sees the session as it is when the view is written, and
    /// fails without touching anything unless both the session and the view
    /// are still on `project`. Batches leave an empty selection once they
    /// run. Returns the outcome and, when posts changed, the full post list
    /// to persist.
    pub(crate) fn apply_step<T, F>(
        &self,
        project: ProjectId,
        batch: bool,
        f: F,
    ) -> Result<(Outcome<T>, Option<Vec<Post>>), PortalError>
    where
        F: FnOnce(&SessionContext, &PostsState) -> Result<Step<T>, PortalError>,
    {
        self.approval.transact(|view| {
            let session = self.session.get();
            if session.selected_project() != Some(project) || view.project() != Some(project) {
                return (None, Err(project_changed(project)));
            }
            let step = match f(&session, view.posts()) {
                Ok(step) => step,
                Err(e) => return (None, Err(e)),
            };
            let applied = step.outcome.is_applied();
            let (next_view, persist) = match step.next {
                Some(posts) => {
                    let persist = posts.to_vec();
                    let next = if batch {
                        view.after_batch(posts)
                    } else {
                        view.with_posts(posts)
                    };
                    (Some(next), Some(persist))
                }
                None if batch && applied => (view.clearing_selection(), None),
                None => (None, None),
            };
            (next_view, Ok((step.outcome, persist)))
        })
    }

    /// Write `posts` to the local cache and the content store, then report
    /// how far they got. Never rolls back the in-memory state.
    pub(crate) async fn persist_posts(&self, project: ProjectId, posts: &[Post]) -> SyncStatus {
        let local = self
            .storage
            .store_json(&posts_cache_key(project), &posts)
            .await;
        if let Err(e) = &local {
            warn!(%project, error = %e, "Failed to cache posts locally");
        }

        match self.content.save_posts(project, posts).await {
            Ok(()) => self.report_sync(SyncLevel::Synced, None).await,
            Err(remote) => {
                warn!(%project, error = %remote, "Content store write failed");
                if local.is_ok() {
                    self.report_sync(
                        SyncLevel::LocalOnly,
                        Some(format!("Saved locally; content store unavailable: {remote}")),
                    )
                    .await
                } else {
                    self.report_sync(SyncLevel::Error, Some(format!("Changes not saved: {remote}")))
                        .await
                }
            }
        }
    }

    /// Report a sync outcome and mirror it for other processes.
    pub(crate) async fn report_sync(&self, level: SyncLevel, message: Option<String>) -> SyncStatus {
        let status = self.sync.report(level, message);
        if let Err(e) = self.storage.store_json(SYNC_STATUS_KEY, &status).await {
            debug!(error = %e, "Failed to mirror sync status");
        }
        status
    }

    pub(crate) async fn read_posts_cache(
        &self,
        project: ProjectId,
    ) -> Result<Option<Vec<Post>>, PortalError> {
        self.storage
            .retrieve_json::<Vec<Post>>(&posts_cache_key(project))
            .await
    }

    async fn reload_branding(&self) -> Result<(), PortalError> {
        let mut overrides = BrandingOverrides::new();
        for key in self.storage.list_keys(Some(BRANDING_KEY_PREFIX)).await? {
            let Some(project) = project_suffix(&key, BRANDING_KEY_PREFIX) else {
                continue;
            };
            if let Some(patch) = self.read_branding(project).await {
                overrides.insert(project, patch);
            }
        }
        self.branding.set(overrides);
        Ok(())
    }

    async fn reload_branding_of(&self, project: ProjectId) -> Result<(), PortalError> {
        let patch = self.read_branding(project).await;
        self.branding.update(|current| {
            let mut next = current.clone();
            match &patch {
                Some(p) => next.insert(project, p.clone()),
                None => next.remove(&project),
            };
            next
        });
        Ok(())
    }

    /// Stored override of `project`; unreadable records count as absent.
    async fn read_branding(&self, project: ProjectId) -> Option<BrandingOverride> {
        match self
            .storage
            .retrieve_json::<BrandingOverride>(&branding_key(project))
            .await
        {
            Ok(patch) => patch,
            Err(e) => {
                warn!(%project, error = %e, "Ignoring unreadable branding override");
                None
            }
        }
    }

    async fn reload_sync_status(&self) -> Result<(), PortalError> {
        match self.storage.retrieve_json::<SyncStatus>(SYNC_STATUS_KEY).await {
            Ok(Some(status)) => self.sync.adopt(status),
            Ok(None) => {}
            Err(PortalError::Serialization { message }) => {
                warn!(%message, "Ignoring unreadable sync status");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

impl std::fmt::Debug for AppCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCore")
            .field("config", &self.config)
            .field("session", &self.session.get())
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

/// Error for an operation whose project was switched away from mid-flight.
pub(crate) fn project_changed(project: ProjectId) -> PortalError {
    PortalError::invalid(format!(
        "selected project changed from {project} during the operation"
    ))
}

fn project_suffix(key: &str, prefix: &str) -> Option<ProjectId> {
    key.strip_prefix(prefix)?.parse().ok()
}
