//! Portal Authentication - credential resolution
//!
//! Turns a submitted username/password pair into a [`Principal`], or
//! [`AuthError::InvalidCredentials`] without revealing which half was wrong.
//!
//! Verification is pluggable through the [`CredentialResolver`] trait:
//!
//! - [`StaticCredentialTable`]: the built-in accounts (super admin plus each
//!   project's administrator and team-member pairs), compared in constant time
//! - [`HashedCredentialTable`]: salted BLAKE3 digests loaded from a TOML file,
//!   for deployments that must not carry plaintext secrets

#![forbid(unsafe_code)]

pub mod hashed;
pub mod principal;
pub mod resolver;
pub mod static_table;

pub use hashed::{hash_password, HashedAccount, HashedCredentialTable};
pub use principal::{AccountKind, Principal};
pub use resolver::{AuthError, CredentialResolver};
pub use static_table::StaticCredentialTable;
