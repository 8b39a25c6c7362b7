//! Salted-digest credential table.
//!
//! Each account stores `hex(BLAKE3-derive-key(CONTEXT, salt || 0x00 || password))`.
//! The file format is TOML:
//!
//! ```toml
//! [[account]]
//! username = "bre"
//! salt = "c0ffee"
//! digest = "…"
//! id = "user-bre"
//! email = "bre@portal.local"
//! display_name = "Bre"
//! role = "super_admin"
//! kind = "super_admin"
//! ```

use crate::principal::{AccountKind, Principal};
use crate::resolver::{AuthError, CredentialResolver};
use async_trait::async_trait;
use portal_authorization::{ProjectId, Role};
use portal_core::PortalError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use subtle::ConstantTimeEq;

const DIGEST_CONTEXT: &str = "portal 2024-06 credential digest v1";

/// Digest a password with a salt, returning lowercase hex.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new_derive_key(DIGEST_CONTEXT);
    hasher.update(salt.as_bytes());
    hasher.update(&[0]);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize().as_bytes())
}

/// One account row of a hashed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedAccount {
    /// Login name
    pub username: String,
    /// Per-account salt
    pub salt: String,
    /// Hex digest from [`hash_password`]
    pub digest: String,
    /// Principal id
    pub id: String,
    /// Contact email
    pub email: String,
    /// Name shown in the UI
    pub display_name: String,
    /// Granted role
    pub role: Role,
    /// Home project for scoped roles
    #[serde(default)]
    pub home_project: Option<ProjectId>,
    /// Account kind
    pub kind: AccountKind,
}

impl HashedAccount {
    /// Build a row for `principal`, digesting `password` with `salt`.
    pub fn new(username: &str, password: &str, salt: &str, principal: &Principal) -> Self {
        Self {
            username: username.to_string(),
            salt: salt.to_string(),
            digest: hash_password(salt, password),
            id: principal.id.clone(),
            email: principal.email.clone(),
            display_name: principal.display_name.clone(),
            role: principal.role,
            home_project: principal.home_project,
            kind: principal.kind,
        }
    }

    fn principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            home_project: self.home_project,
            kind: self.kind,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HashedTableFile {
    #[serde(default, rename = "account")]
    accounts: Vec<HashedAccount>,
}

/// Credential table holding only salted digests.
#[derive(Debug, Clone, Default)]
pub struct HashedCredentialTable {
    accounts: Vec<HashedAccount>,
}

impl HashedCredentialTable {
    /// Build from rows, rejecting duplicate usernames and scoped roles
    /// without a matching home project.
    pub fn from_accounts(accounts: Vec<HashedAccount>) -> Result<Self, PortalError> {
        for (i, account) in accounts.iter().enumerate() {
            if accounts[..i].iter().any(|a| a.username == account.username) {
                return Err(PortalError::config(format!(
                    "duplicate account: {}",
                    account.username
                )));
            }
            if let Some(scope) = account.role.scope() {
                if account.home_project != Some(scope) {
                    return Err(PortalError::config(format!(
                        "account {} has role {} but home project {:?}",
                        account.username, account.role, account.home_project
                    )));
                }
            }
            if !hex::decode(&account.digest).is_ok_and(|d| d.len() == blake3::OUT_LEN) {
                return Err(PortalError::config(format!(
                    "account {} has a malformed digest",
                    account.username
                )));
            }
        }
        Ok(Self { accounts })
    }

    /// Parse the TOML table format.
    pub fn from_toml_str(raw: &str) -> Result<Self, PortalError> {
        let file: HashedTableFile = toml::from_str(raw)
            .map_err(|e| PortalError::config(format!("invalid credential table: {e}")))?;
        Self::from_accounts(file.accounts)
    }

    /// Read and parse a TOML table file.
    pub fn load(path: &Path) -> Result<Self, PortalError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PortalError::config(format!(
                "failed to read credential table {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Render the table in its TOML file format.
    pub fn to_toml_string(&self) -> Result<String, PortalError> {
        let file = HashedTableFile {
            accounts: self.accounts.clone(),
        };
        toml::to_string(&file).map_err(|e| PortalError::serialization(e.to_string()))
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if there are no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl CredentialResolver for HashedCredentialTable {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let mut found = None;
        for account in &self.accounts {
            let digest = hash_password(&account.salt, password);
            let matched = account.username.as_bytes().ct_eq(username.as_bytes())
                & account.digest.as_bytes().ct_eq(digest.as_bytes());
            if bool::from(matched) && found.is_none() {
                found = Some(account);
            }
        }

        found
            .map(HashedAccount::principal)
            .ok_or(AuthError::InvalidCredentials)
    }
}
