// Command handlers

/// Sign-in and project selection
pub mod account;

/// Project rebranding
pub mod branding;

/// Post review
pub mod posts;

/// Sync indicator
pub mod sync;

pub use branding::BrandingCommand;
pub use posts::PostsCommand;
