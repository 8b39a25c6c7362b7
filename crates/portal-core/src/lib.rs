//! Portal Core - Foundation for the multi-tenant client portal
//!
//! This crate provides the foundational types and effect interfaces shared by
//! every other portal crate. It contains no application logic and no runtime
//! coupling: handlers live in `portal-effects`, domain rules in the
//! authorization, authentication and app crates.
//!
//! # Contents
//!
//! - [`PortalError`]: the unified error type, including the authorization and
//!   authentication failure kinds every frontend needs to tell apart
//! - [`reactive`]: `Dynamic<T>`, a versioned shared value with poll-based
//!   subscriptions
//! - [`effects`]: `StorageEffects` (durable key-value store) and
//!   `PhysicalTimeEffects` (wall clock) interfaces
//! - [`config`]: configuration traits implemented by application configs

#![forbid(unsafe_code)]

pub mod config;
pub mod effects;
pub mod errors;
pub mod reactive;

pub use config::{ConfigDefaults, ConfigMerge, ConfigValidation};
pub use effects::{
    PhysicalTime, PhysicalTimeEffects, StorageEffects, StorageError, StorageJsonExt, TimeError,
};
pub use errors::{ErrorCategory, PortalError, Result};
pub use reactive::{Dynamic, Subscription};
