//! Group role hierarchy
//!
//! Roles for community groups. The hierarchy is: Member < Moderator < Admin.

use serde::{Deserialize, Serialize};

use crate::actions::MemberAction;
use crate::hierarchy::Role;

/// Role within a group.
///
/// Roles are hierarchical, with each role inheriting the permissions of
/// lower roles. The hierarchy is: Member < Moderator < Admin
///
/// # Permission Model
///
/// - **Member**: Participates; may invite only when group settings allow it
/// - **Moderator**: Invites, approves join requests, removes and blocks members
/// - **Admin**: Full group control including roles, settings, and deletion
///
/// # Examples
///
/// ```
/// use portal_roles::{GroupRole, MemberAction, Role};
///
/// let role = GroupRole::Moderator;
/// assert!(role.permits(MemberAction::RemoveMember));
/// assert!(!role.permits(MemberAction::DeleteEntity));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    /// Regular group member
    Member = 0,

    /// Can moderate members and approve requests
    Moderator = 1,

    /// Full group control
    Admin = 2,
}

impl Role for GroupRole {
    fn lowest() -> Self {
        GroupRole::Member
    }

    fn top() -> Self {
        GroupRole::Admin
    }

    fn min_role(action: MemberAction) -> Self {
        match action {
            MemberAction::InviteMember => GroupRole::Moderator,
            MemberAction::ApproveRequest => GroupRole::Moderator,
            MemberAction::RemoveMember => GroupRole::Moderator,
            MemberAction::BlockMember => GroupRole::Moderator,
            // Group settings are open to moderators as well as admins.
            MemberAction::UpdateEntity => GroupRole::Moderator,
            MemberAction::UpdateRole => GroupRole::Admin,
            MemberAction::DeleteEntity => GroupRole::Admin,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Member => "member",
            GroupRole::Moderator => "moderator",
            GroupRole::Admin => "admin",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(GroupRole::Member),
            "moderator" => Some(GroupRole::Moderator),
            "admin" => Some(GroupRole::Admin),
            _ => None,
        }
    }

    fn all() -> Vec<Self> {
        vec![GroupRole::Member, GroupRole::Moderator, GroupRole::Admin]
    }
}

impl GroupRole {
    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            GroupRole::Member => "Member",
            GroupRole::Moderator => "Moderator",
            GroupRole::Admin => "Admin",
        }
    }
}

impl Default for GroupRole {
    fn default() -> Self {
        GroupRole::Member
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_role_hierarchy() {
        assert!(GroupRole::Admin > GroupRole::Moderator);
        assert!(GroupRole::Moderator > GroupRole::Member);
        assert_eq!(GroupRole::lowest(), GroupRole::Member);
        assert_eq!(GroupRole::top(), GroupRole::Admin);
    }

    #[test]
    fn test_group_role_permissions() {
        assert!(!GroupRole::Member.permits(MemberAction::InviteMember));
        assert!(GroupRole::Moderator.permits(MemberAction::InviteMember));
        assert!(GroupRole::Moderator.permits(MemberAction::RemoveMember));
        assert!(GroupRole::Moderator.permits(MemberAction::UpdateEntity));
        assert!(!GroupRole::Moderator.permits(MemberAction::UpdateRole));
        assert!(!GroupRole::Moderator.permits(MemberAction::DeleteEntity));
        assert!(GroupRole::Admin.permits(MemberAction::UpdateRole));
        assert!(GroupRole::Admin.permits(MemberAction::DeleteEntity));
    }

    #[test]
    fn test_group_role_outranking() {
        assert!(GroupRole::Admin.outranks(GroupRole::Moderator));
        assert!(GroupRole::Moderator.outranks(GroupRole::Member));
        assert!(!GroupRole::Moderator.outranks(GroupRole::Admin));
        assert!(!GroupRole::Admin.outranks(GroupRole::Admin));
    }

    #[test]
    fn test_group_role_parse() {
        assert_eq!(GroupRole::parse("admin"), Some(GroupRole::Admin));
        assert_eq!(GroupRole::parse("MODERATOR"), Some(GroupRole::Moderator));
        assert_eq!(GroupRole::parse("invalid"), None);
    }

    #[test]
    fn test_group_role_as_str() {
        for role in GroupRole::all() {
            assert_eq!(GroupRole::parse(role.as_str()), Some(role));
        }
    }
}
