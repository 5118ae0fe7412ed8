//! Authorization gate
//!
//! Every privileged governance mutation passes through one checkpoint:
//! resolve the caller's identity, load their membership, verify it is
//! active, and compare their role against the action's threshold. The
//! checks run in that order so the caller always gets the most specific
//! refusal.

use portal_roles::{MemberAction, Role};
use uuid::Uuid;

use crate::error::{GovernanceError, GovernanceResult};
use crate::membership::{Membership, MembershipStatus};
use crate::store::MembershipStore;

/// The identity attempting an operation.
///
/// Anonymous callers are representable so the gate, not the transport
/// layer, decides that authentication is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    user_id: Option<Uuid>,
}

impl Caller {
    /// A verified user.
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// An unauthenticated caller.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Resolve the caller's user id, refusing anonymous callers.
    pub fn id(&self) -> GovernanceResult<Uuid> {
        self.user_id.ok_or(GovernanceError::Unauthenticated)
    }
}

/// Membership-based authorization checkpoint.
///
/// Borrows the store so gate checks and the mutation that follows them
/// read through the same handle within one operation.
pub struct AuthorizationGate<'a, R: Role, S: MembershipStore<R>> {
    store: &'a S,
    _role: std::marker::PhantomData<R>,
}

impl<'a, R: Role, S: MembershipStore<R>> AuthorizationGate<'a, R, S> {
    /// Creates a gate over the given store.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _role: std::marker::PhantomData,
        }
    }

    /// Authorize `caller` to act on `entity_id` at `threshold` or above.
    ///
    /// Returns the caller's active membership on success, so operations
    /// can compare roles against a target without a second load.
    pub async fn authorize(
        &self,
        caller: Caller,
        entity_id: Uuid,
        threshold: R,
    ) -> GovernanceResult<Membership<R>> {
        let user_id = caller.id()?;

        let membership = self
            .store
            .membership(entity_id, user_id)
            .await?
            .ok_or(GovernanceError::NotAMember)?;

        match membership.status {
            MembershipStatus::Active => {}
            MembershipStatus::Blocked => return Err(GovernanceError::Blocked),
            _ => return Err(GovernanceError::NotAMember),
        }

        if !membership.role.is_at_least(threshold) {
            return Err(GovernanceError::InsufficientRole);
        }

        Ok(membership)
    }

    /// Authorize `caller` for `action`, using the hierarchy's minimum
    /// role for that action as the threshold.
    pub async fn authorize_action(
        &self,
        caller: Caller,
        entity_id: Uuid,
        action: MemberAction,
    ) -> GovernanceResult<Membership<R>> {
        self.authorize(caller, entity_id, R::min_role(action)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use portal_roles::GroupRole;

    async fn seed_member(
        store: &MemoryStore<GroupRole>,
        entity_id: Uuid,
        role: GroupRole,
        status: MembershipStatus,
    ) -> Uuid {
        let user_id = Uuid::now_v7();
        store
            .put_membership(Membership::new(entity_id, user_id, role, status))
            .await
            .unwrap();
        user_id
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_refused_first() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let gate = AuthorizationGate::new(&store);

        let err = gate
            .authorize(Caller::anonymous(), Uuid::now_v7(), GroupRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err, GovernanceError::Unauthenticated);
    }

    #[tokio::test]
    async fn test_non_member_is_refused() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let gate = AuthorizationGate::new(&store);

        let err = gate
            .authorize(Caller::user(Uuid::now_v7()), Uuid::now_v7(), GroupRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err, GovernanceError::NotAMember);
    }

    #[tokio::test]
    async fn test_blocked_member_gets_specific_refusal() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let entity_id = Uuid::now_v7();
        let blocked =
            seed_member(&store, entity_id, GroupRole::Admin, MembershipStatus::Blocked).await;

        let gate = AuthorizationGate::new(&store);
        let err = gate
            .authorize(Caller::user(blocked), entity_id, GroupRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err, GovernanceError::Blocked);
    }

    #[tokio::test]
    async fn test_pending_member_is_not_a_member_yet() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let entity_id = Uuid::now_v7();
        let invited =
            seed_member(&store, entity_id, GroupRole::Member, MembershipStatus::Invited).await;

        let gate = AuthorizationGate::new(&store);
        let err = gate
            .authorize(Caller::user(invited), entity_id, GroupRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err, GovernanceError::NotAMember);
    }

    #[tokio::test]
    async fn test_threshold_check() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let entity_id = Uuid::now_v7();
        let member =
            seed_member(&store, entity_id, GroupRole::Member, MembershipStatus::Active).await;
        let moderator =
            seed_member(&store, entity_id, GroupRole::Moderator, MembershipStatus::Active).await;

        let gate = AuthorizationGate::new(&store);

        let err = gate
            .authorize_action(Caller::user(member), entity_id, MemberAction::InviteMember)
            .await
            .unwrap_err();
        assert_eq!(err, GovernanceError::InsufficientRole);

        let membership = gate
            .authorize_action(Caller::user(moderator), entity_id, MemberAction::InviteMember)
            .await
            .unwrap();
        assert_eq!(membership.role, GroupRole::Moderator);
    }
}
