//! Session context: who is signed in and which project they are looking at.

use portal_authentication::Principal;
use portal_authorization::{Capability, CapabilitySet, PermissionMatrix, ProjectId};
use portal_core::PortalError;
use std::sync::Arc;

/// The signed-in principal, the selected project, and the capabilities that
/// follow from both.
///
/// Every capability query answers for the selected project. With no
/// principal, or no selected project, every query answers deny-all.
#[derive(Debug, Clone)]
pub struct SessionContext {
    principal: Option<Principal>,
    selected_project: Option<ProjectId>,
    matrix: Arc<PermissionMatrix>,
}

impl SessionContext {
    /// A signed-out session over `matrix`.
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self {
            principal: None,
            selected_project: None,
            matrix,
        }
    }

    /// Sign `principal` in and select its default project.
    pub fn signed_in(matrix: Arc<PermissionMatrix>, principal: Principal) -> Self {
        let selected_project = default_project(&matrix, &principal);
        Self {
            principal: Some(principal),
            selected_project,
            matrix,
        }
    }

    /// Rebuild a session from persisted values.
    ///
    /// The stored project is kept only if the principal's role can still
    /// view it; otherwise the default project is selected.
    pub fn restored(
        matrix: Arc<PermissionMatrix>,
        principal: Principal,
        stored_project: Option<ProjectId>,
    ) -> Self {
        let selected_project = stored_project
            .filter(|p| matrix.is_accessible(principal.role, *p))
            .or_else(|| default_project(&matrix, &principal));
        Self {
            principal: Some(principal),
            selected_project,
            matrix,
        }
    }

    /// Signed-in principal
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Selected project
    pub fn selected_project(&self) -> Option<ProjectId> {
        self.selected_project
    }

    /// Whether anyone is signed in
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Matrix the session resolves capabilities with
    pub fn matrix(&self) -> &Arc<PermissionMatrix> {
        &self.matrix
    }

    /// Projects the principal can view, in declaration order.
    pub fn accessible_projects(&self) -> Vec<ProjectId> {
        self.principal
            .as_ref()
            .map(|p| self.matrix.accessible_projects(p.role))
            .unwrap_or_default()
    }

    /// Switch to `project`, failing if the principal's role cannot view it.
    pub fn select_project(&mut self, project: ProjectId) -> Result<(), PortalError> {
        match &self.principal {
            Some(principal) if self.matrix.is_accessible(principal.role, project) => {
                self.selected_project = Some(project);
                Ok(())
            }
            _ => Err(PortalError::project_not_accessible(project.as_str())),
        }
    }

    /// Capabilities in `project`, deny-all when signed out.
    pub fn capabilities_in(&self, project: ProjectId) -> CapabilitySet {
        self.principal
            .as_ref()
            .map_or(CapabilitySet::DENY_ALL, |p| {
                self.matrix.capabilities_for(p.role, project)
            })
    }

    /// Capabilities in the selected project.
    pub fn capabilities(&self) -> CapabilitySet {
        self.selected_project
            .map_or(CapabilitySet::DENY_ALL, |p| self.capabilities_in(p))
    }

    /// Whether `capability` is held in the selected project.
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities().allows(capability)
    }

    /// Hard-error form of [`allows`](Self::allows), for collaborators that
    /// surface refusals instead of ignoring them.
    pub fn require(&self, capability: Capability) -> Result<(), PortalError> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(PortalError::forbidden(capability.as_str()))
        }
    }

    /// Hard-error check of `capability` in a specific project.
    pub fn require_in(&self, project: ProjectId, capability: Capability) -> Result<(), PortalError> {
        if self.capabilities_in(project).allows(capability) {
            Ok(())
        } else {
            Err(PortalError::forbidden(format!("{capability} in {project}")))
        }
    }

    /// See the selected project
    pub fn can_view(&self) -> bool {
        self.allows(Capability::View)
    }

    /// Change content, approve posts
    pub fn can_edit(&self) -> bool {
        self.allows(Capability::Edit)
    }

    /// Administer accounts
    pub fn can_manage_users(&self) -> bool {
        self.allows(Capability::ManageUsers)
    }

    /// Rebrand the project
    pub fn can_manage_branding(&self) -> bool {
        self.allows(Capability::ManageBranding)
    }

    /// Upload knowledge documents
    pub fn can_upload_knowledge(&self) -> bool {
        self.allows(Capability::UploadKnowledge)
    }

    /// Comment on content
    pub fn can_comment(&self) -> bool {
        self.allows(Capability::Comment)
    }

    /// Message the content team
    pub fn can_send_messages(&self) -> bool {
        self.allows(Capability::SendMessages)
    }
}

/// Home project if the role can view it, else the first accessible one.
fn default_project(matrix: &PermissionMatrix, principal: &Principal) -> Option<ProjectId> {
    principal
        .home_project
        .filter(|home| matrix.is_accessible(principal.role, *home))
        .or_else(|| matrix.accessible_projects(principal.role).first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_authentication::AccountKind;
    use portal_authorization::Role;

    fn principal(role: Role, home: Option<ProjectId>) -> Principal {
        Principal {
            id: "user-test".into(),
            email: "test@portal.local".into(),
            display_name: "Test".into(),
            role,
            home_project: home,
            kind: AccountKind::TeamMember,
        }
    }

    fn standard() -> Arc<PermissionMatrix> {
        Arc::new(PermissionMatrix::standard())
    }

    #[test]
    fn test_signed_out_denies_everything() {
        let session = SessionContext::new(standard());
        assert!(session.capabilities().is_deny_all());
        assert!(session.accessible_projects().is_empty());
        assert!(!session.can_view());
    }

    #[test]
    fn test_home_project_selected_by_default() {
        let session =
            SessionContext::signed_in(standard(), principal(Role::TvhTeam, Some(ProjectId::Tvh)));
        assert_eq!(session.selected_project(), Some(ProjectId::Tvh));
        assert!(session.can_edit());
        assert!(!session.can_manage_branding());
    }

    #[test]
    fn test_inaccessible_home_falls_back_to_first_accessible() {
        let matrix = PermissionMatrix::builder()
            .grant(Role::SbhTeam, ProjectId::Tvh, CapabilitySet::VIEWER)
            .build()
            .unwrap();
        let session = SessionContext::signed_in(
            Arc::new(matrix),
            principal(Role::SbhTeam, Some(ProjectId::Sbh)),
        );
        assert_eq!(session.selected_project(), Some(ProjectId::Tvh));
    }

    #[test]
    fn test_select_inaccessible_project_rejected() {
        let mut session =
            SessionContext::signed_in(standard(), principal(Role::ZrmcTeam, Some(ProjectId::Zrmc)));
        let err = session.select_project(ProjectId::Sbh).unwrap_err();
        assert_eq!(err, PortalError::project_not_accessible("sbh"));
        assert_eq!(session.selected_project(), Some(ProjectId::Zrmc));
    }

    #[test]
    fn test_require_reports_forbidden_action() {
        let session =
            SessionContext::signed_in(standard(), principal(Role::ZrmcTeam, Some(ProjectId::Zrmc)));
        assert!(session.require(Capability::Edit).is_ok());
        assert!(matches!(
            session.require(Capability::ManageUsers),
            Err(PortalError::ForbiddenAction { .. })
        ));
        assert!(session
            .require_in(ProjectId::Tvh, Capability::View)
            .is_err());
    }

    #[test]
    fn test_restored_revalidates_stored_project() {
        let session = SessionContext::restored(
            standard(),
            principal(Role::SbhTeam, Some(ProjectId::Sbh)),
            Some(ProjectId::Zrmc),
        );
        assert_eq!(session.selected_project(), Some(ProjectId::Sbh));

        let admin = SessionContext::restored(
            standard(),
            principal(Role::SuperAdmin, None),
            Some(ProjectId::Sbh),
        );
        assert_eq!(admin.selected_project(), Some(ProjectId::Sbh));
    }
}
