//! # Workflows - Portable Business Logic
//!
//! Multi-step operations shared by every frontend.
//!
//! ## Design Patterns
//!
//! **1. AppCore Integration**
//! - All workflows take an `&Arc<RwLock<AppCore>>`
//! - State changes go through AppCore's reactive values, so any observer
//!   sees them without extra wiring
//!
//! **2. Authorization**
//! - Post transitions are gated on the session's capabilities and are
//!   silently refused (an [`Outcome::Refused`](crate::approval::Outcome))
//! - Branding and post submission return
//!   [`PortalError::ForbiddenAction`](portal_core::PortalError) instead
//!
//! **3. Persistence**
//! - Local state changes first and is never rolled back
//! - Durable writes report their result through sync status

pub mod account;
pub mod approval;
pub mod branding;
pub mod sync;

pub use account::{accessible_projects, current_session, login, logout, rehydrate, select_project};
pub use approval::{
    apply_to_selection, approval_view, approve_all, approve_post, approve_selected,
    clear_selection, deselect_post, load_posts, publish, request_edit, request_edit_selected,
    resubmit, select_all_pending, select_post, submit_post, toggle_post,
};
pub use branding::{accessible_projects_branded, clear_branding, effective_project, update_branding};
pub use sync::{listen_sync_status, on_storage_changed, subscribe_sync_status, sync_status};
