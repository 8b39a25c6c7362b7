//! Sync Workflow - status queries and cross-process reloads

use crate::core::AppCore;
use crate::sync::SyncStatus;
use async_lock::RwLock;
use portal_core::{PortalError, Subscription};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Last reported sync status, `idle` if none yet.
pub async fn sync_status(app_core: &Arc<RwLock<AppCore>>) -> SyncStatus {
    app_core.read().await.sync().current_status()
}

/// Poll-style view of sync status.
pub async fn subscribe_sync_status(app_core: &Arc<RwLock<AppCore>>) -> Subscription<SyncStatus> {
    app_core.read().await.sync().subscribe()
}

/// Push-style view of sync status.
pub async fn listen_sync_status(
    app_core: &Arc<RwLock<AppCore>>,
) -> broadcast::Receiver<SyncStatus> {
    app_core.read().await.sync().listen()
}

/// Notify the core that another process wrote `key`
///
/// **What it does**: Re-reads the affected session, sync status, branding or
/// post cache value
/// **Returns**: Unit result; unrelated keys are ignored
/// **Signal pattern**: Replaces the affected value wholesale
pub async fn on_storage_changed(
    app_core: &Arc<RwLock<AppCore>>,
    key: &str,
) -> Result<(), PortalError> {
    app_core.read().await.on_storage_changed(key).await
}
