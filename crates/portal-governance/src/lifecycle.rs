//! Join lifecycle decisions
//!
//! Pure decision logic for unmediated join attempts. The engine gathers
//! the entity and any prior membership record, asks this module what
//! should happen, then performs the writes. Keeping the decision pure
//! makes the privacy matrix directly testable.

use crate::entity::{Entity, Privacy};
use crate::error::{GovernanceError, GovernanceResult};
use crate::membership::MembershipStatus;

/// Outcome of a permitted join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The user becomes an active member immediately
    Joined,

    /// A join request was recorded, pending approval
    Requested,
}

impl JoinOutcome {
    /// The membership status this outcome writes.
    pub fn status(&self) -> MembershipStatus {
        match self {
            JoinOutcome::Joined => MembershipStatus::Active,
            JoinOutcome::Requested => MembershipStatus::Requested,
        }
    }
}

/// Decide what an unmediated join attempt does, given the entity and the
/// user's prior membership status (if any record exists).
///
/// A `removed` record does not bar re-joining; an `invited` record is
/// also treated as absent here, since joining a public entity should not
/// be harder for someone who happens to hold an invitation.
pub fn decide_join(
    entity: &Entity,
    prior_status: Option<MembershipStatus>,
) -> GovernanceResult<JoinOutcome> {
    match prior_status {
        Some(MembershipStatus::Active) => return Err(GovernanceError::AlreadyMember),
        Some(MembershipStatus::Blocked) => return Err(GovernanceError::Blocked),
        Some(MembershipStatus::Requested) => return Err(GovernanceError::RequestAlreadyPending),
        Some(MembershipStatus::Removed) | Some(MembershipStatus::Invited) | None => {}
    }

    match entity.privacy {
        Privacy::Public => Ok(JoinOutcome::Joined),
        Privacy::Restricted => {
            if entity.settings.auto_approve_members {
                Ok(JoinOutcome::Joined)
            } else {
                Ok(JoinOutcome::Requested)
            }
        }
        Privacy::Private => Err(GovernanceError::InvitationRequired),
    }
}
