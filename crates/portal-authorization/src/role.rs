//! Roles a principal can hold.

use crate::project::ProjectId;
use portal_core::PortalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of roles.
///
/// `SuperAdmin` spans every project. Each tenant family has exactly one
/// project-scoped role used by both of that project's accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Operator of the whole portal
    SuperAdmin,
    /// Team role for Zion Regional Medical Center
    ZrmcTeam,
    /// Team role for Teton Valley Health
    TvhTeam,
    /// Team role for Summit Behavioral Health
    SbhTeam,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::ZrmcTeam, Role::TvhTeam, Role::SbhTeam];

    /// Number of roles.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`Role::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::SuperAdmin => 0,
            Self::ZrmcTeam => 1,
            Self::TvhTeam => 2,
            Self::SbhTeam => 3,
        }
    }

    /// The project a scoped role belongs to; `None` for `SuperAdmin`.
    pub const fn scope(self) -> Option<ProjectId> {
        match self {
            Self::SuperAdmin => None,
            Self::ZrmcTeam => Some(ProjectId::Zrmc),
            Self::TvhTeam => Some(ProjectId::Tvh),
            Self::SbhTeam => Some(ProjectId::Sbh),
        }
    }

    /// The scoped role for a project's accounts.
    pub const fn for_project(project: ProjectId) -> Role {
        match project {
            ProjectId::Zrmc => Self::ZrmcTeam,
            ProjectId::Tvh => Self::TvhTeam,
            ProjectId::Sbh => Self::SbhTeam,
        }
    }

    /// Stable snake_case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::ZrmcTeam => "zrmc_team",
            Self::TvhTeam => "tvh_team",
            Self::SbhTeam => "sbh_team",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PortalError::invalid(format!("unknown role: {wanted}")))
    }
}
