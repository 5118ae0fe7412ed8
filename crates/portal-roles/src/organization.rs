//! Organization role hierarchy
//!
//! Roles for tenant organizations. The hierarchy is:
//! Student < Viewer < Editor < Admin < Owner.

use serde::{Deserialize, Serialize};

use crate::actions::MemberAction;
use crate::hierarchy::Role;

/// Role within an organization.
///
/// Roles are hierarchical, with each role inheriting the permissions of
/// lower roles. The hierarchy is: Student < Viewer < Editor < Admin < Owner
///
/// # Permission Model
///
/// - **Student**: Enrolled access to purchased or granted content
/// - **Viewer**: Read-only access to organization resources
/// - **Editor**: Can create and edit content
/// - **Admin**: Manages members, invitations, and join requests
/// - **Owner**: Full organization control including roles, settings, deletion
///
/// # Examples
///
/// ```
/// use portal_roles::{MemberAction, OrganizationRole, Role};
///
/// let role = OrganizationRole::Admin;
/// assert!(role.permits(MemberAction::InviteMember));
/// assert!(!role.permits(MemberAction::DeleteEntity));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRole {
    /// Enrolled learner access
    Student = 0,

    /// Read-only access to organization resources
    Viewer = 1,

    /// Can create and edit content
    Editor = 2,

    /// Can manage members and invitations
    Admin = 3,

    /// Full organization control
    Owner = 4,
}

impl Role for OrganizationRole {
    fn lowest() -> Self {
        OrganizationRole::Student
    }

    fn top() -> Self {
        OrganizationRole::Owner
    }

    fn min_role(action: MemberAction) -> Self {
        match action {
            MemberAction::InviteMember => OrganizationRole::Admin,
            MemberAction::ApproveRequest => OrganizationRole::Admin,
            MemberAction::RemoveMember => OrganizationRole::Admin,
            MemberAction::BlockMember => OrganizationRole::Admin,
            MemberAction::UpdateRole => OrganizationRole::Admin,
            MemberAction::UpdateEntity => OrganizationRole::Admin,
            MemberAction::DeleteEntity => OrganizationRole::Owner,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            OrganizationRole::Student => "student",
            OrganizationRole::Viewer => "viewer",
            OrganizationRole::Editor => "editor",
            OrganizationRole::Admin => "admin",
            OrganizationRole::Owner => "owner",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "student" => Some(OrganizationRole::Student),
            "viewer" => Some(OrganizationRole::Viewer),
            "editor" => Some(OrganizationRole::Editor),
            "admin" => Some(OrganizationRole::Admin),
            "owner" => Some(OrganizationRole::Owner),
            _ => None,
        }
    }

    fn all() -> Vec<Self> {
        vec![
            OrganizationRole::Student,
            OrganizationRole::Viewer,
            OrganizationRole::Editor,
            OrganizationRole::Admin,
            OrganizationRole::Owner,
        ]
    }
}

impl OrganizationRole {
    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            OrganizationRole::Student => "Student",
            OrganizationRole::Viewer => "Viewer",
            OrganizationRole::Editor => "Editor",
            OrganizationRole::Admin => "Admin",
            OrganizationRole::Owner => "Owner",
        }
    }

    /// Check if this role can edit content.
    pub fn can_edit(&self) -> bool {
        *self >= OrganizationRole::Editor
    }
}

impl Default for OrganizationRole {
    fn default() -> Self {
        OrganizationRole::Viewer
    }
}
