//! # Member actions
//!
//! Defines the governed operations a member can attempt against an entity.
//! Each role hierarchy maps these actions to a minimum role threshold.

use serde::{Deserialize, Serialize};

/// Actions governed by a role threshold.
///
/// These are the mutations that run through the authorization gate.
/// Read paths (listing members, viewing an entity) are not governed here;
/// visibility is a property of the entity's privacy, not of a role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemberAction {
    /// Invite a user into the entity.
    ///
    /// Entity settings may additionally open this to plain members.
    InviteMember,

    /// Approve or reject a pending join request.
    ApproveRequest,

    /// Remove another member from the entity.
    RemoveMember,

    /// Change another member's role.
    UpdateRole,

    /// Block a user from the entity.
    BlockMember,

    /// Update the entity's profile, privacy, or settings.
    UpdateEntity,

    /// Delete the entity.
    DeleteEntity,
}

impl MemberAction {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberAction::InviteMember => "invite_member",
            MemberAction::ApproveRequest => "approve_request",
            MemberAction::RemoveMember => "remove_member",
            MemberAction::UpdateRole => "update_role",
            MemberAction::BlockMember => "block_member",
            MemberAction::UpdateEntity => "update_entity",
            MemberAction::DeleteEntity => "delete_entity",
        }
    }

    /// Parse an action from its string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use portal_roles::MemberAction;
    ///
    /// assert_eq!(MemberAction::parse("invite_member"), Some(MemberAction::InviteMember));
    /// assert_eq!(MemberAction::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "invite_member" | "invite" => Some(MemberAction::InviteMember),
            "approve_request" | "approve" => Some(MemberAction::ApproveRequest),
            "remove_member" | "remove" => Some(MemberAction::RemoveMember),
            "update_role" | "promote" | "demote" => Some(MemberAction::UpdateRole),
            "block_member" | "block" => Some(MemberAction::BlockMember),
            "update_entity" | "update" => Some(MemberAction::UpdateEntity),
            "delete_entity" | "delete" => Some(MemberAction::DeleteEntity),
            _ => None,
        }
    }

    /// Get all governed actions.
    pub fn all() -> Vec<Self> {
        vec![
            MemberAction::InviteMember,
            MemberAction::ApproveRequest,
            MemberAction::RemoveMember,
            MemberAction::UpdateRole,
            MemberAction::BlockMember,
            MemberAction::UpdateEntity,
            MemberAction::DeleteEntity,
        ]
    }

    /// Check if this action targets another member (as opposed to the
    /// entity itself).
    ///
    /// Member-targeted actions are additionally subject to outranking
    /// checks: the target must not outrank the caller.
    pub fn targets_member(&self) -> bool {
        matches!(
            self,
            MemberAction::RemoveMember | MemberAction::UpdateRole | MemberAction::BlockMember
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        for action in MemberAction::all() {
            assert_eq!(MemberAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_action_aliases() {
        assert_eq!(MemberAction::parse("invite"), Some(MemberAction::InviteMember));
        assert_eq!(MemberAction::parse("promote"), Some(MemberAction::UpdateRole));
        assert_eq!(MemberAction::parse("BLOCK"), Some(MemberAction::BlockMember));
        assert_eq!(MemberAction::parse("invalid"), None);
    }

    #[test]
    fn test_targets_member() {
        assert!(MemberAction::RemoveMember.targets_member());
        assert!(MemberAction::UpdateRole.targets_member());
        assert!(MemberAction::BlockMember.targets_member());
        assert!(!MemberAction::InviteMember.targets_member());
        assert!(!MemberAction::DeleteEntity.targets_member());
    }

    #[test]
    fn test_all_actions_count() {
        assert_eq!(MemberAction::all().len(), 7);
    }
}
