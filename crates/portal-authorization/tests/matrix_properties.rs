//! Property tests for the permission matrix.

use portal_authorization::{CapabilitySet, PermissionMatrix, ProjectId, Role};
use proptest::prelude::*;

fn role() -> impl Strategy<Value = Role> {
    proptest::sample::select(Role::ALL.to_vec())
}

fn project() -> impl Strategy<Value = ProjectId> {
    proptest::sample::select(ProjectId::ALL.to_vec())
}

fn capability_set() -> impl Strategy<Value = CapabilitySet> {
    proptest::sample::select(vec![
        CapabilitySet::VIEWER,
        CapabilitySet::EDITOR,
        CapabilitySet::FULL,
    ])
}

proptest! {
    #[test]
    fn unlisted_cells_deny_everything(
        granted_role in role(),
        granted_project in project(),
        set in capability_set(),
        query_role in role(),
        query_project in project(),
    ) {
        let matrix = PermissionMatrix::builder()
            .grant(granted_role, granted_project, set)
            .build()
            .unwrap();

        let caps = matrix.capabilities_for(query_role, query_project);
        if (query_role, query_project) == (granted_role, granted_project) {
            prop_assert_eq!(caps, set);
        } else {
            prop_assert!(caps.is_deny_all());
        }
    }

    #[test]
    fn accessible_projects_is_stable_subset(r in role()) {
        let matrix = PermissionMatrix::standard();
        let first = matrix.accessible_projects(r);
        let second = matrix.accessible_projects(r);

        prop_assert_eq!(&first, &second);
        prop_assert!(first.iter().all(|p| ProjectId::ALL.contains(p)));

        // declaration order is preserved
        let mut sorted = first.clone();
        sorted.sort_by_key(|p| p.index());
        prop_assert_eq!(first, sorted);
    }

    #[test]
    fn helpers_project_capabilities(r in role(), p in project()) {
        let matrix = PermissionMatrix::standard();
        let caps = matrix.capabilities_for(r, p);
        prop_assert_eq!(matrix.can_edit(r, p), caps.edit);
        prop_assert_eq!(matrix.can_manage_branding(r, p), caps.manage_branding);
        prop_assert_eq!(matrix.can_upload_knowledge(r, p), caps.upload_knowledge);
        prop_assert_eq!(matrix.can_comment(r, p), caps.comment);
        prop_assert_eq!(matrix.can_send_messages(r, p), caps.send_messages);
        prop_assert_eq!(matrix.is_accessible(r, p), caps.view);
    }
}
