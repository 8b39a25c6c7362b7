//! Portal App - headless application core
//!
//! Everything a portal frontend needs beyond rendering:
//!
//! - [`SessionContext`]: the signed-in principal, the selected project and
//!   the capability booleans derived from them
//! - [`ApprovalEngine`]: the post lifecycle state machine with single and
//!   batch transitions, gated on the session's capabilities
//! - [`SyncStatusBroadcaster`]: the process-wide indicator of whether the
//!   last mutation reached the content store, only local storage, or nothing
//! - [`AppCore`] and [`workflows`]: the handlers and the multi-step
//!   operations frontends call
//!
//! ## Example
//!
//! ```rust,ignore
//! let app = Arc::new(RwLock::new(AppCore::new(AppConfig::default())?));
//! workflows::login(&app, "zrmc-team", password).await?;
//! workflows::load_posts(&app).await?;
//! workflows::approve_all(&app).await?;
//! println!("{}", workflows::sync_status(&app).await.level);
//! ```

#![forbid(unsafe_code)]

pub mod approval;
pub mod config;
pub mod content;
pub mod core;
pub mod session;
pub mod sync;
pub mod workflows;

pub use crate::approval::{
    ApprovalEngine, ApprovalError, ApprovalView, BatchAction, BatchOutcome, Outcome, Platform,
    Post, PostId, PostStatus, PostsState, Refusal,
};
pub use crate::config::{AppConfig, CredentialsConfig};
pub use crate::content::{ContentStore, StorageContentStore};
pub use crate::core::AppCore;
pub use crate::session::SessionContext;
pub use crate::sync::{SyncLevel, SyncStatus, SyncStatusBroadcaster};
