//! # Session
//!
//! The signed-in principal and selected project, the capability booleans
//! derived from them, and their persistence.

mod context;
mod persistence;

pub use context::SessionContext;
pub use persistence::{
    clear_session, load_session, save_project, save_session, StoredSession, PRINCIPAL_KEY,
    PROJECT_KEY,
};
