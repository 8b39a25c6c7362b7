// Sync indicator

use async_lock::RwLock;
use portal_app::{workflows, AppCore};
use std::sync::Arc;

pub async fn show(app: &Arc<RwLock<AppCore>>) {
    let status = workflows::sync_status(app).await;
    println!("Status:  {}", status.level);
    if let Some(message) = &status.message {
        println!("Message: {message}");
    }
    if let Some(at) = status.updated_at {
        println!("Updated: {} ms", at.ts_ms);
    }
}
