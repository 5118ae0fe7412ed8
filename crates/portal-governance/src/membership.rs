//! Membership domain models
//!
//! This module provides the membership record linking a user to an entity.
//! There is at most one membership per (entity, user) pair; the store
//! upserts on that key. Removal is a status transition, not a delete, so
//! role and join history survive for auditing.

use chrono::{DateTime, Utc};
use portal_roles::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a membership.
///
/// ```text
///            ┌────────── accept invitation ──────────┐
/// (none) ──> invited                                 v
/// (none) ──> requested ── approve ──────────────> active ──┐
/// (none) ──────────────── join (public) ────────────┘      │
///                                                leave / removed
///                                                          v
///   any  ──────────────── block ──> blocked             removed
/// ```
///
/// `removed` is terminal for the relationship but not for the record:
/// a later join or invitation reactivates it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Full member
    Active,

    /// Invited, awaiting the user's acceptance
    Invited,

    /// Asked to join, awaiting moderator approval
    Requested,

    /// Barred from the entity
    Blocked,

    /// Left or was removed; record retained
    Removed,
}

impl MembershipStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Invited => "invited",
            MembershipStatus::Requested => "requested",
            MembershipStatus::Blocked => "blocked",
            MembershipStatus::Removed => "removed",
        }
    }

    /// Check if this status grants member access.
    pub fn is_active(&self) -> bool {
        matches!(self, MembershipStatus::Active)
    }

    /// Check if this status is pending someone's decision.
    pub fn is_pending(&self) -> bool {
        matches!(self, MembershipStatus::Invited | MembershipStatus::Requested)
    }
}

/// Membership linking a user to an entity.
///
/// Carries the user's role (drawn from the entity kind's hierarchy), the
/// lifecycle status, and provenance (when they joined, who invited them).
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use portal_roles::GroupRole;
/// use portal_governance::{Membership, MembershipStatus};
///
/// let entity_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let membership = Membership::new(entity_id, user_id, GroupRole::Member, MembershipStatus::Active);
/// assert!(membership.is_active());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership<R> {
    /// Unique membership ID
    pub id: Uuid,

    /// Entity ID
    pub entity_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the entity
    pub role: R,

    /// Lifecycle status
    pub status: MembershipStatus,

    /// When the user joined (or was first recorded)
    pub joined_at: DateTime<Utc>,

    /// Who invited this user (if applicable)
    pub invited_by: Option<Uuid>,

    /// When the record was last changed
    pub updated_at: DateTime<Utc>,
}

impl<R: Role> Membership<R> {
    /// Creates a new membership record.
    pub fn new(entity_id: Uuid, user_id: Uuid, role: R, status: MembershipStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            entity_id,
            user_id,
            role,
            status,
            joined_at: now,
            invited_by: None,
            updated_at: now,
        }
    }

    /// Set who invited this user.
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }

    /// Check if this membership grants member access.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Check if this membership keeps the entity administered: an active
    /// member holding the hierarchy's top role.
    pub fn counts_for_succession(&self) -> bool {
        self.status.is_active() && self.role.is_top()
    }

    /// Transition the status in place, bumping `updated_at`.
    pub fn set_status(&mut self, status: MembershipStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Change the role in place, bumping `updated_at`.
    pub fn set_role(&mut self, role: R) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_roles::GroupRole;

    #[test]
    fn test_membership_creation() {
        let entity_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let membership =
            Membership::new(entity_id, user_id, GroupRole::Member, MembershipStatus::Active);

        assert_eq!(membership.entity_id, entity_id);
        assert_eq!(membership.user_id, user_id);
        assert_eq!(membership.role, GroupRole::Member);
        assert!(membership.is_active());
        assert!(membership.invited_by.is_none());
    }

    #[test]
    fn test_membership_with_inviter() {
        let inviter_id = Uuid::now_v7();
        let membership = Membership::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            GroupRole::Member,
            MembershipStatus::Invited,
        )
        .with_inviter(inviter_id);

        assert_eq!(membership.invited_by, Some(inviter_id));
        assert!(membership.status.is_pending());
    }

    #[test]
    fn test_counts_for_succession() {
        let entity_id = Uuid::now_v7();
        let admin = Membership::new(
            entity_id,
            Uuid::now_v7(),
            GroupRole::Admin,
            MembershipStatus::Active,
        );
        assert!(admin.counts_for_succession());

        let removed_admin = Membership::new(
            entity_id,
            Uuid::now_v7(),
            GroupRole::Admin,
            MembershipStatus::Removed,
        );
        assert!(!removed_admin.counts_for_succession());

        let member = Membership::new(
            entity_id,
            Uuid::now_v7(),
            GroupRole::Member,
            MembershipStatus::Active,
        );
        assert!(!member.counts_for_succession());
    }

    #[test]
    fn test_set_status() {
        let mut membership = Membership::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            GroupRole::Member,
            MembershipStatus::Requested,
        );
        membership.set_status(MembershipStatus::Active);
        assert!(membership.is_active());
    }
}
