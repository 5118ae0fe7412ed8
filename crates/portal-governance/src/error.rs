//! Error types for governance operations
//!
//! Every failure is detected before any write and surfaced as a typed,
//! user-presentable error. Nothing here triggers retries; retries, if
//! any, belong to the caller.

use portal_roles::MemberAction;
use thiserror::Error;
use uuid::Uuid;

/// Governance error types.
///
/// These cover authorization failures, missing records, lifecycle
/// conflicts, and the last-admin invariant. Callers can match
/// exhaustively to present each case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// No verified caller identity is present
    #[error("Authentication required")]
    Unauthenticated,

    /// The target entity does not exist
    #[error("Entity not found")]
    EntityNotFound,

    /// The invitation does not exist
    #[error("Invitation not found")]
    InvitationNotFound,

    /// The target user has no (live) membership in the entity
    #[error("Member not found in this entity")]
    MembershipNotFound,

    /// The caller has no membership in the entity
    #[error("Not a member of this entity")]
    NotAMember,

    /// The caller or target has been blocked from the entity
    #[error("Blocked from this entity")]
    Blocked,

    /// The caller's role does not meet the required threshold
    #[error("Insufficient role for this action")]
    InsufficientRole,

    /// The caller's role is too low relative to the target's role
    #[error("Cannot act on a member with an equal or higher role")]
    RankOutranked,

    /// The user already holds an active membership
    #[error("Already a member of this entity")]
    AlreadyMember,

    /// A pending invitation for this user already exists
    #[error("Invitation already pending for this user")]
    InviteAlreadyPending,

    /// A join request from this user is already pending
    #[error("Membership request already pending")]
    RequestAlreadyPending,

    /// The entity is private; joining requires an invitation
    #[error("This entity is invitation-only")]
    InvitationRequired,

    /// The invitation is addressed to a different user
    #[error("Not authorized to respond to this invitation")]
    NotYourInvitation,

    /// The invitation was already accepted or declined
    #[error("Invitation is no longer pending")]
    InvitationNotPending,

    /// The invitation's validity window has lapsed
    #[error("Invitation has expired")]
    InvitationExpired,

    /// The entity was deleted after the invitation was issued
    #[error("The entity for this invitation no longer exists")]
    EntityGone,

    /// The mutation would leave the entity without an active
    /// administrator; another member must be promoted first
    #[error("Cannot {} the last active administrator of entity {entity_id}; promote another member first", action.as_str())]
    LastAdminViolation {
        /// Entity whose administration would lapse
        entity_id: Uuid,
        /// The mutation that was attempted
        action: MemberAction,
    },

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for governance operations.
pub type GovernanceResult<T> = Result<T, GovernanceError>;

impl GovernanceError {
    /// Check if this error should be logged at error level.
    ///
    /// Most variants are expected business outcomes; only backend
    /// failures are server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, GovernanceError::Storage(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GovernanceError::Unauthenticated => 401,

            GovernanceError::NotAMember
            | GovernanceError::Blocked
            | GovernanceError::InsufficientRole
            | GovernanceError::RankOutranked
            | GovernanceError::InvitationRequired
            | GovernanceError::NotYourInvitation => 403,

            GovernanceError::EntityNotFound
            | GovernanceError::InvitationNotFound
            | GovernanceError::MembershipNotFound
            | GovernanceError::EntityGone => 404,

            GovernanceError::AlreadyMember
            | GovernanceError::InviteAlreadyPending
            | GovernanceError::RequestAlreadyPending
            | GovernanceError::InvitationNotPending
            | GovernanceError::InvitationExpired
            | GovernanceError::LastAdminViolation { .. } => 400,

            GovernanceError::Storage(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GovernanceError::Unauthenticated => "UNAUTHENTICATED",
            GovernanceError::EntityNotFound => "ENTITY_NOT_FOUND",
            GovernanceError::InvitationNotFound => "INVITATION_NOT_FOUND",
            GovernanceError::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            GovernanceError::NotAMember => "NOT_A_MEMBER",
            GovernanceError::Blocked => "BLOCKED",
            GovernanceError::InsufficientRole => "INSUFFICIENT_ROLE",
            GovernanceError::RankOutranked => "RANK_OUTRANKED",
            GovernanceError::AlreadyMember => "ALREADY_MEMBER",
            GovernanceError::InviteAlreadyPending => "INVITE_ALREADY_PENDING",
            GovernanceError::RequestAlreadyPending => "REQUEST_ALREADY_PENDING",
            GovernanceError::InvitationRequired => "INVITATION_REQUIRED",
            GovernanceError::NotYourInvitation => "NOT_YOUR_INVITATION",
            GovernanceError::InvitationNotPending => "INVITATION_NOT_PENDING",
            GovernanceError::InvitationExpired => "INVITATION_EXPIRED",
            GovernanceError::EntityGone => "ENTITY_GONE",
            GovernanceError::LastAdminViolation { .. } => "LAST_ADMIN_VIOLATION",
            GovernanceError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GovernanceError::Unauthenticated.status_code(), 401);
        assert_eq!(GovernanceError::InsufficientRole.status_code(), 403);
        assert_eq!(GovernanceError::EntityNotFound.status_code(), 404);
        assert_eq!(GovernanceError::AlreadyMember.status_code(), 400);
        assert_eq!(
            GovernanceError::LastAdminViolation {
                entity_id: Uuid::now_v7(),
                action: MemberAction::RemoveMember,
            }
            .status_code(),
            400
        );
        assert_eq!(GovernanceError::Storage("down".into()).status_code(), 500);
    }

    #[test]
    fn test_last_admin_violation_carries_context() {
        let entity_id = Uuid::now_v7();
        let err = GovernanceError::LastAdminViolation {
            entity_id,
            action: MemberAction::UpdateRole,
        };
        let message = err.to_string();
        assert!(message.contains("update_role"));
        assert!(message.contains(&entity_id.to_string()));
    }

    #[test]
    fn test_is_server_error() {
        assert!(GovernanceError::Storage("oops".into()).is_server_error());
        assert!(!GovernanceError::Blocked.is_server_error());
    }
}
