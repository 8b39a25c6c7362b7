//! Built-in credential table.

use crate::principal::{AccountKind, Principal};
use crate::resolver::{AuthError, CredentialResolver};
use async_trait::async_trait;
use portal_authorization::{CredentialPair, CredentialSlot, ProjectRegistry, Role};
use subtle::{Choice, ConstantTimeEq};

const SUPER_ADMIN_USERNAME: &str = "bre";
const SUPER_ADMIN_PASSWORD: &str = "1Lampshade!";

#[derive(Debug, Clone)]
struct StaticAccount {
    credentials: CredentialPair,
    principal: Principal,
}

/// The portal's fixed accounts: one super admin plus the administrator and
/// team-member pairs of every registered project.
///
/// Every lookup compares against every entry so response time does not
/// depend on which account (if any) matched.
#[derive(Debug, Clone)]
pub struct StaticCredentialTable {
    accounts: Vec<StaticAccount>,
}

impl StaticCredentialTable {
    /// Build the table from a project registry.
    pub fn from_registry(registry: &ProjectRegistry) -> Self {
        let mut accounts = vec![StaticAccount {
            credentials: CredentialPair::new(SUPER_ADMIN_USERNAME, SUPER_ADMIN_PASSWORD),
            principal: Principal {
                id: "user-bre".to_string(),
                email: "bre@portal.local".to_string(),
                display_name: "Bre".to_string(),
                role: Role::SuperAdmin,
                home_project: None,
                kind: AccountKind::SuperAdmin,
            },
        }];

        for project in registry.all() {
            for slot in CredentialSlot::ALL {
                let pair = project.credentials.pair(slot);
                let (kind, label) = match slot {
                    CredentialSlot::Administrator => (AccountKind::Administrator, "Administrator"),
                    CredentialSlot::TeamMember => (AccountKind::TeamMember, "Team"),
                };
                accounts.push(StaticAccount {
                    credentials: pair.clone(),
                    principal: Principal {
                        id: format!("user-{}", pair.username),
                        email: format!("{}@{}.portal.local", pair.username, project.id),
                        display_name: format!("{} {label}", project.id.as_str().to_uppercase()),
                        role: Role::for_project(project.id),
                        home_project: Some(project.id),
                        kind,
                    },
                });
            }
        }

        Self { accounts }
    }

    /// The built-in table over the global registry.
    pub fn builtin() -> Self {
        Self::from_registry(ProjectRegistry::global())
    }

    /// Usernames in table order.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.accounts.iter().map(|a| a.credentials.username.as_str())
    }

    /// The principal template for a username, without checking a password.
    pub fn principal_for(&self, username: &str) -> Option<&Principal> {
        self.accounts
            .iter()
            .find(|a| a.credentials.username == username)
            .map(|a| &a.principal)
    }

    fn resolve(&self, username: &str, password: &str) -> Option<&Principal> {
        let mut found: Option<&Principal> = None;
        for account in &self.accounts {
            let user_ok = account
                .credentials
                .username
                .as_bytes()
                .ct_eq(username.as_bytes());
            let pass_ok = account
                .credentials
                .password()
                .as_bytes()
                .ct_eq(password.as_bytes());
            let matched: Choice = user_ok & pass_ok;
            if bool::from(matched) && found.is_none() {
                found = Some(&account.principal);
            }
        }
        found
    }
}

impl Default for StaticCredentialTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentialTable {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        match self.resolve(username, password) {
            Some(principal) => {
                tracing::debug!(principal = %principal.id, role = %principal.role, "credentials accepted");
                Ok(principal.clone())
            }
            None => Err(AuthError::InvalidCredentials),
        }
    }
}
