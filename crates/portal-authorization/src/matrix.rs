//! # Permission Matrix
//!
//! A total function over `Role × ProjectId`. The backing table has one cell
//! per pair, filled with [`CapabilitySet::DENY_ALL`] before any grant is
//! applied, so a forgotten row denies instead of panicking or erroring.

use crate::capability::{Capability, CapabilitySet};
use crate::project::ProjectId;
use crate::role::Role;
use portal_core::PortalError;

type Cells = [[CapabilitySet; ProjectId::COUNT]; Role::COUNT];

/// Maps `(role, project)` to the capabilities granted there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    cells: Cells,
}

impl PermissionMatrix {
    /// Start an empty (deny-all) matrix.
    pub fn builder() -> PermissionMatrixBuilder {
        PermissionMatrixBuilder {
            cells: [[CapabilitySet::DENY_ALL; ProjectId::COUNT]; Role::COUNT],
        }
    }

    /// The portal's standard grants.
    ///
    /// - `SuperAdmin`: everything, everywhere
    /// - project team roles: editor rights in their own project only
    pub fn standard() -> Self {
        let mut cells = [[CapabilitySet::DENY_ALL; ProjectId::COUNT]; Role::COUNT];
        for role in Role::ALL {
            for project in ProjectId::ALL {
                cells[role.index()][project.index()] = match role.scope() {
                    None => CapabilitySet::FULL,
                    Some(home) if home == project => CapabilitySet::EDITOR,
                    Some(_) => CapabilitySet::DENY_ALL,
                };
            }
        }
        Self { cells }
    }

    /// Capabilities of `role` in `project`. Never fails.
    pub fn capabilities_for(&self, role: Role, project: ProjectId) -> CapabilitySet {
        self.cells[role.index()][project.index()]
    }

    /// Whether `role` holds `capability` in `project`.
    pub fn allows(&self, role: Role, project: ProjectId, capability: Capability) -> bool {
        self.capabilities_for(role, project).allows(capability)
    }

    /// Whether `role` may edit content in `project`.
    pub fn can_edit(&self, role: Role, project: ProjectId) -> bool {
        self.allows(role, project, Capability::Edit)
    }

    /// Whether `role` may change branding in `project`.
    pub fn can_manage_branding(&self, role: Role, project: ProjectId) -> bool {
        self.allows(role, project, Capability::ManageBranding)
    }

    /// Whether `role` may upload knowledge documents in `project`.
    pub fn can_upload_knowledge(&self, role: Role, project: ProjectId) -> bool {
        self.allows(role, project, Capability::UploadKnowledge)
    }

    /// Whether `role` may comment in `project`.
    pub fn can_comment(&self, role: Role, project: ProjectId) -> bool {
        self.allows(role, project, Capability::Comment)
    }

    /// Whether `role` may send messages in `project`.
    pub fn can_send_messages(&self, role: Role, project: ProjectId) -> bool {
        self.allows(role, project, Capability::SendMessages)
    }

    /// Projects `role` can view, in [`ProjectId::ALL`] order.
    pub fn accessible_projects(&self, role: Role) -> Vec<ProjectId> {
        ProjectId::ALL
            .into_iter()
            .filter(|project| self.capabilities_for(role, *project).view)
            .collect()
    }

    /// Whether `role` can view `project`.
    pub fn is_accessible(&self, role: Role, project: ProjectId) -> bool {
        self.capabilities_for(role, project).view
    }

    /// Every cell in role-major declaration order.
    pub fn rows(&self) -> impl Iterator<Item = (Role, ProjectId, CapabilitySet)> + '_ {
        Role::ALL.into_iter().flat_map(move |role| {
            ProjectId::ALL
                .into_iter()
                .map(move |project| (role, project, self.capabilities_for(role, project)))
        })
    }
}

impl Default for PermissionMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for custom matrices (tests, alternative deployments).
#[derive(Debug, Clone)]
pub struct PermissionMatrixBuilder {
    cells: Cells,
}

impl PermissionMatrixBuilder {
    /// Set the capabilities of one cell, replacing any earlier grant.
    pub fn grant(mut self, role: Role, project: ProjectId, set: CapabilitySet) -> Self {
        self.cells[role.index()][project.index()] = set;
        self
    }

    /// Grant `set` to `role` in every project.
    pub fn grant_everywhere(mut self, role: Role, set: CapabilitySet) -> Self {
        for project in ProjectId::ALL {
            self.cells[role.index()][project.index()] = set;
        }
        self
    }

    /// Finish, rejecting cells where an administrative capability is granted
    /// without `edit`.
    pub fn build(self) -> Result<PermissionMatrix, PortalError> {
        let matrix = PermissionMatrix { cells: self.cells };
        let offenders: Vec<String> = matrix
            .rows()
            .filter(|(_, _, set)| !set.is_consistent())
            .map(|(role, project, _)| format!("{role}/{project}"))
            .collect();

        if !offenders.is_empty() {
            return Err(PortalError::invalid(format!(
                "manage capabilities granted without edit: {}",
                offenders.join(", ")
            )));
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_sees_everything() {
        let matrix = PermissionMatrix::standard();
        assert_eq!(
            matrix.accessible_projects(Role::SuperAdmin),
            ProjectId::ALL.to_vec()
        );
        for project in ProjectId::ALL {
            assert_eq!(
                matrix.capabilities_for(Role::SuperAdmin, project),
                CapabilitySet::FULL
            );
        }
    }

    #[test]
    fn test_scoped_roles_see_one_project() {
        let matrix = PermissionMatrix::standard();
        assert_eq!(
            matrix.accessible_projects(Role::ZrmcTeam),
            vec![ProjectId::Zrmc]
        );
        assert!(matrix.can_edit(Role::ZrmcTeam, ProjectId::Zrmc));
        assert!(!matrix.can_manage_branding(Role::ZrmcTeam, ProjectId::Zrmc));
        assert!(matrix
            .capabilities_for(Role::ZrmcTeam, ProjectId::Tvh)
            .is_deny_all());
    }

    #[test]
    fn test_builder_defaults_to_deny_all() {
        let matrix = PermissionMatrix::builder()
            .grant(Role::TvhTeam, ProjectId::Tvh, CapabilitySet::VIEWER)
            .build()
            .unwrap();

        assert!(matrix
            .capabilities_for(Role::SuperAdmin, ProjectId::Zrmc)
            .is_deny_all());
        assert_eq!(matrix.accessible_projects(Role::TvhTeam), vec![ProjectId::Tvh]);
        assert!(!matrix.can_edit(Role::TvhTeam, ProjectId::Tvh));
    }

    #[test]
    fn test_builder_rejects_inconsistent_cells() {
        let bad = CapabilitySet {
            view: true,
            manage_users: true,
            ..CapabilitySet::DENY_ALL
        };
        let err = PermissionMatrix::builder()
            .grant(Role::SbhTeam, ProjectId::Sbh, bad)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("sbh_team/sbh"));
    }

    #[test]
    fn test_standard_matrix_is_consistent() {
        let matrix = PermissionMatrix::standard();
        assert!(matrix.rows().all(|(_, _, set)| set.is_consistent()));
        assert_eq!(matrix.rows().count(), Role::COUNT * ProjectId::COUNT);
    }
}
