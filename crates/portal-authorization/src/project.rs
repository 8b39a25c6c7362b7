//! # Project Registry
//!
//! Static catalog of tenant projects. Every project carries a complete theme
//! (five color slots, never partial) and exactly one credential pair per
//! account kind (administrator, team member).

use once_cell::sync::Lazy;
use portal_core::PortalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Project identity
// ============================================================================

/// Tenant project identifier.
///
/// Declaration order is significant: it is the order in which accessible
/// projects are listed and the first accessible one is the default selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectId {
    /// Zion Regional Medical Center
    Zrmc,
    /// Teton Valley Health
    Tvh,
    /// Summit Behavioral Health
    Sbh,
}

impl ProjectId {
    /// Every project, in declaration order.
    pub const ALL: [ProjectId; 3] = [ProjectId::Zrmc, ProjectId::Tvh, ProjectId::Sbh];

    /// Number of known projects.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`ProjectId::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Zrmc => 0,
            Self::Tvh => 1,
            Self::Sbh => 2,
        }
    }

    /// Stable lowercase key used in storage keys and URLs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zrmc => "zrmc",
            Self::Tvh => "tvh",
            Self::Sbh => "sbh",
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectId {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PortalError::not_found(format!("unknown project: {wanted}")))
    }
}

// ============================================================================
// Theme
// ============================================================================

/// A `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse a `#RRGGBB` hex color; the stored form is uppercase.
    pub fn parse(raw: &str) -> Result<Self, PortalError> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| PortalError::invalid(format!("color must start with '#': {trimmed}")))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PortalError::invalid(format!(
                "color must be #RRGGBB: {trimmed}"
            )));
        }
        Ok(Self(format!("#{}", hex.to_ascii_uppercase())))
    }

    /// The `#RRGGBB` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = PortalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete project theme. All five slots are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Main brand color
    pub primary: Color,
    /// Secondary brand color
    pub secondary: Color,
    /// Highlight color for calls to action
    pub accent: Color,
    /// Page background
    pub background: Color,
    /// Body text
    pub text: Color,
}

impl ThemeColors {
    fn from_hex(
        primary: &str,
        secondary: &str,
        accent: &str,
        background: &str,
        text: &str,
    ) -> Result<Self, PortalError> {
        Ok(Self {
            primary: Color::parse(primary)?,
            secondary: Color::parse(secondary)?,
            accent: Color::parse(accent)?,
            background: Color::parse(background)?,
            text: Color::parse(text)?,
        })
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// A username/password pair.
///
/// The password is never serialized and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialPair {
    /// Login name
    pub username: String,
    #[serde(skip_serializing)]
    password: String,
}

impl CredentialPair {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The secret half of the pair.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Which of a project's two accounts a credential pair belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSlot {
    /// Project administrator
    Administrator,
    /// Shared team-member login
    TeamMember,
}

impl CredentialSlot {
    /// Both slots, administrator first.
    pub const ALL: [CredentialSlot; 2] = [CredentialSlot::Administrator, CredentialSlot::TeamMember];
}

/// The two accounts every project owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCredentials {
    /// Project administrator account
    pub administrator: CredentialPair,
    /// Shared team-member account
    pub team_member: CredentialPair,
}

impl ProjectCredentials {
    /// The pair stored in `slot`.
    pub fn pair(&self, slot: CredentialSlot) -> &CredentialPair {
        match slot {
            CredentialSlot::Administrator => &self.administrator,
            CredentialSlot::TeamMember => &self.team_member,
        }
    }
}

// ============================================================================
// Project
// ============================================================================

/// A tenant project with its descriptive metadata and theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Immutable identity
    pub id: ProjectId,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Logo location (path or URL)
    pub logo: String,
    /// Full theme
    pub colors: ThemeColors,
    /// Administrator and team-member credential pairs
    pub credentials: ProjectCredentials,
}

/// Static catalog of every known project.
#[derive(Debug, Clone)]
pub struct ProjectRegistry {
    projects: [Project; ProjectId::COUNT],
}

static BUILTIN: Lazy<ProjectRegistry> = Lazy::new(ProjectRegistry::builtin);

impl ProjectRegistry {
    /// Shared instance of the built-in catalog.
    pub fn global() -> &'static ProjectRegistry {
        &BUILTIN
    }

    /// Build the built-in catalog.
    pub fn builtin() -> Self {
        Self {
            projects: ProjectId::ALL.map(builtin_project),
        }
    }

    /// Look up a project. Total: every `ProjectId` has an entry.
    pub fn get(&self, id: ProjectId) -> &Project {
        &self.projects[id.index()]
    }

    /// All projects in declaration order.
    pub fn all(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    /// Find the project and credential slot owning a username.
    pub fn find_by_username(&self, username: &str) -> Option<(&Project, CredentialSlot)> {
        self.projects.iter().find_map(|project| {
            CredentialSlot::ALL
                .into_iter()
                .find(|slot| project.credentials.pair(*slot).username == username)
                .map(|slot| (project, slot))
        })
    }
}

impl Default for ProjectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::expect_used)]
fn builtin_project(id: ProjectId) -> Project {
    // Literal hex values below are fixed; a parse failure is a typo caught by tests.
    let theme = |p, s, a, b, t| ThemeColors::from_hex(p, s, a, b, t).expect("builtin theme");
    match id {
        ProjectId::Zrmc => Project {
            id,
            name: "Zion Regional Medical Center".to_string(),
            description: "Regional hospital network serving southern Utah".to_string(),
            logo: "/logos/zrmc.svg".to_string(),
            colors: theme("#0B3C5D", "#328CC1", "#D9B310", "#F5F7FA", "#1D2731"),
            credentials: ProjectCredentials {
                administrator: CredentialPair::new("zrmc-admin", "Zrmc#Admin2024"),
                team_member: CredentialPair::new("zrmc-team", "Zrmc#Team2024"),
            },
        },
        ProjectId::Tvh => Project {
            id,
            name: "Teton Valley Health".to_string(),
            description: "Critical access hospital and rural clinics".to_string(),
            logo: "/logos/tvh.svg".to_string(),
            colors: theme("#2E5E4E", "#6B9080", "#F4A259", "#FAF9F6", "#222222"),
            credentials: ProjectCredentials {
                administrator: CredentialPair::new("tvh-admin", "Tvh#Admin2024"),
                team_member: CredentialPair::new("tvh-team", "Tvh#Team2024"),
            },
        },
        ProjectId::Sbh => Project {
            id,
            name: "Summit Behavioral Health".to_string(),
            description: "Outpatient behavioral health practice".to_string(),
            logo: "/logos/sbh.svg".to_string(),
            colors: theme("#4B3F72", "#8E7DBE", "#F2C14E", "#FFFFFF", "#2B2D42"),
            credentials: ProjectCredentials {
                administrator: CredentialPair::new("sbh-admin", "Sbh#Admin2024"),
                team_member: CredentialPair::new("sbh-team", "Sbh#Team2024"),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_total_and_ordered() {
        let registry = ProjectRegistry::builtin();
        let ids: Vec<_> = registry.all().map(|p| p.id).collect();
        assert_eq!(ids, ProjectId::ALL.to_vec());
        for id in ProjectId::ALL {
            assert_eq!(registry.get(id).id, id);
        }
    }

    #[test]
    fn test_credentials_are_unique() {
        let registry = ProjectRegistry::builtin();
        let mut names: Vec<_> = registry
            .all()
            .flat_map(|p| {
                [
                    p.credentials.administrator.username.clone(),
                    p.credentials.team_member.username.clone(),
                ]
            })
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ProjectId::COUNT * 2);
    }

    #[test]
    fn test_project_id_parse() {
        assert_eq!("ZRMC".parse::<ProjectId>().unwrap(), ProjectId::Zrmc);
        assert_eq!(" tvh ".parse::<ProjectId>().unwrap(), ProjectId::Tvh);
        assert!("acme".parse::<ProjectId>().is_err());
    }

    #[test]
    fn test_color_parse_normalizes() {
        assert_eq!(Color::parse("#abcdef").unwrap().as_str(), "#ABCDEF");
        assert!(Color::parse("abcdef").is_err());
        assert!(Color::parse("#abc").is_err());
        assert!(Color::parse("#GGGGGG").is_err());
    }

    #[test]
    fn test_password_never_serialized_or_debugged() {
        let project = ProjectRegistry::builtin().get(ProjectId::Zrmc).clone();
        let json = serde_json::to_string(&project).unwrap();
        assert!(!json.contains("Zrmc#Admin2024"));
        assert!(json.contains("zrmc-admin"));

        let debug = format!("{:?}", project.credentials.administrator);
        assert!(!debug.contains("Zrmc#Admin2024"));
    }

    #[test]
    fn test_find_by_username() {
        let registry = ProjectRegistry::builtin();
        let (project, slot) = registry.find_by_username("tvh-team").unwrap();
        assert_eq!(project.id, ProjectId::Tvh);
        assert_eq!(slot, CredentialSlot::TeamMember);
        assert!(registry.find_by_username("nobody").is_none());
    }
}
