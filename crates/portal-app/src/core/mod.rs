//! # Core Application Module
//!
//! - [`AppCore`]: handlers plus reactive session, approval and branding state
//! - storage key helpers shared by workflows and cross-process reloads

mod app;

pub use app::{
    branding_key, posts_cache_key, AppCore, BrandingOverrides, BRANDING_KEY_PREFIX,
    POSTS_CACHE_KEY_PREFIX,
};
pub(crate) use app::project_changed;
