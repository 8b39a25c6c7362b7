//! Portal Authorization - tenants, roles and capabilities
//!
//! Answers the one question every collaborator asks before acting:
//! *may this role do X in project Y?*
//!
//! - [`ProjectRegistry`]: the static catalog of tenant projects, their
//!   metadata, theme and credential pairs
//! - [`BrandingOverride`]: a persisted per-project patch merged over the
//!   static defaults field by field
//! - [`Role`]: the closed set of roles a principal can hold
//! - [`PermissionMatrix`]: a total map from `(Role, ProjectId)` to
//!   [`CapabilitySet`]; cells never granted are deny-all

#![forbid(unsafe_code)]

pub mod branding;
pub mod capability;
pub mod matrix;
pub mod project;
pub mod role;

pub use branding::{BrandingOverride, ThemeColorsOverride};
pub use capability::{Capability, CapabilitySet};
pub use matrix::{PermissionMatrix, PermissionMatrixBuilder};
pub use project::{
    Color, CredentialPair, CredentialSlot, Project, ProjectCredentials, ProjectId, ProjectRegistry,
    ThemeColors,
};
pub use role::Role;
