//! Effect interfaces
//!
//! Pure trait signatures for the side effects the portal performs. Production
//! handlers live in `portal-effects`; test doubles live in `portal-testkit`.
//!
//! - [`StorageEffects`]: durable local key-value store (session, branding,
//!   post cache, last sync status)
//! - [`PhysicalTimeEffects`]: wall-clock time in milliseconds since the epoch

pub mod storage;
pub mod time;

pub use storage::{StorageEffects, StorageError, StorageJsonExt};
pub use time::{PhysicalTime, PhysicalTimeEffects, TimeError};
