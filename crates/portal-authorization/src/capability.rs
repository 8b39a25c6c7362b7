//! Capability sets attached to each `(role, project)` cell.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// See the project at all
    View,
    /// Change content, including approving posts
    Edit,
    /// Manage the project's user accounts
    ManageUsers,
    /// Change name, logo and theme
    ManageBranding,
    /// Upload knowledge-base documents
    UploadKnowledge,
    /// Comment on content
    Comment,
    /// Send messages to the agency team
    SendMessages,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Capability; 7] = [
        Capability::View,
        Capability::Edit,
        Capability::ManageUsers,
        Capability::ManageBranding,
        Capability::UploadKnowledge,
        Capability::Comment,
        Capability::SendMessages,
    ];

    /// Stable snake_case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::ManageUsers => "manage_users",
            Self::ManageBranding => "manage_branding",
            Self::UploadKnowledge => "upload_knowledge",
            Self::Comment => "comment",
            Self::SendMessages => "send_messages",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved booleans for one `(role, project)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// See the project
    pub view: bool,
    /// Change content
    pub edit: bool,
    /// Manage user accounts
    pub manage_users: bool,
    /// Change branding
    pub manage_branding: bool,
    /// Upload knowledge documents
    pub upload_knowledge: bool,
    /// Comment on content
    pub comment: bool,
    /// Send messages
    pub send_messages: bool,
}

impl CapabilitySet {
    /// Every capability false.
    pub const DENY_ALL: CapabilitySet = CapabilitySet {
        view: false,
        edit: false,
        manage_users: false,
        manage_branding: false,
        upload_knowledge: false,
        comment: false,
        send_messages: false,
    };

    /// Every capability true.
    pub const FULL: CapabilitySet = CapabilitySet {
        view: true,
        edit: true,
        manage_users: true,
        manage_branding: true,
        upload_knowledge: true,
        comment: true,
        send_messages: true,
    };

    /// Day-to-day editor within a project: everything except user and
    /// branding administration.
    pub const EDITOR: CapabilitySet = CapabilitySet {
        view: true,
        edit: true,
        manage_users: false,
        manage_branding: false,
        upload_knowledge: true,
        comment: true,
        send_messages: true,
    };

    /// Read-only access.
    pub const VIEWER: CapabilitySet = CapabilitySet {
        view: true,
        ..CapabilitySet::DENY_ALL
    };

    /// Whether `capability` is granted.
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.view,
            Capability::Edit => self.edit,
            Capability::ManageUsers => self.manage_users,
            Capability::ManageBranding => self.manage_branding,
            Capability::UploadKnowledge => self.upload_knowledge,
            Capability::Comment => self.comment,
            Capability::SendMessages => self.send_messages,
        }
    }

    /// True if nothing is granted.
    pub fn is_deny_all(&self) -> bool {
        *self == Self::DENY_ALL
    }

    /// Administrative capabilities require `edit`.
    pub const fn is_consistent(&self) -> bool {
        !(self.manage_users || self.manage_branding) || self.edit
    }

    /// Granted capabilities, in [`Capability::ALL`] order.
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.allows(*c))
            .collect()
    }
}
