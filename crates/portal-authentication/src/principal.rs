//! Authenticated identities.

use portal_authorization::{ProjectId, Role};
use serde::{Deserialize, Serialize};

/// Which kind of account a principal logged in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Portal-wide operator
    SuperAdmin,
    /// A project's administrator pair
    Administrator,
    /// A project's shared team-member pair
    TeamMember,
}

/// An authenticated user, produced only by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Internal account id
    pub id: String,
    /// Contact email
    pub email: String,
    /// Name shown in the UI
    pub display_name: String,
    /// Role driving the permission matrix
    pub role: Role,
    /// Project selected by default after login, for project-scoped accounts
    #[serde(default)]
    pub home_project: Option<ProjectId>,
    /// Account kind used to log in
    pub kind: AccountKind,
}

impl Principal {
    /// True for the portal-wide operator.
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}
