//! Governance engine
//!
//! The engine is the single entry point for membership mutations. Each
//! operation follows the same shape: resolve the caller, authorize
//! through the gate, validate the target's lifecycle state, check the
//! admin-succession guard where relevant, then write. Cascading cleanup
//! (content purges, invitation notifications) is handed to the task
//! queue rather than performed inline.

use std::marker::PhantomData;
use std::sync::Arc;

use portal_roles::{MemberAction, Role};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use portal_tasks::{Task, TaskKind, TaskQueue};

use crate::entity::{Entity, EntityPatch, Privacy};
use crate::error::{GovernanceError, GovernanceResult};
use crate::gate::{AuthorizationGate, Caller};
use crate::invitation::{Invitation, InvitationStatus};
use crate::lifecycle::{decide_join, JoinOutcome};
use crate::membership::{Membership, MembershipStatus};
use crate::store::MembershipStore;

/// Membership and invitation governance over a store and a task queue.
///
/// Generic over the role hierarchy, so one engine serves groups
/// (`GroupRole`) and organizations (`OrganizationRole`) with the same
/// lifecycle rules and differing thresholds.
pub struct GovernanceEngine<R: Role, S: MembershipStore<R>> {
    store: S,
    tasks: Arc<dyn TaskQueue>,
    _role: PhantomData<R>,
}

impl<R: Role, S: MembershipStore<R>> GovernanceEngine<R, S> {
    /// Creates an engine over the given store and task queue.
    pub fn new(store: S, tasks: Arc<dyn TaskQueue>) -> Self {
        Self {
            store,
            tasks,
            _role: PhantomData,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn gate(&self) -> AuthorizationGate<'_, R, S> {
        AuthorizationGate::new(&self.store)
    }

    async fn enqueue(&self, task: Task) -> GovernanceResult<()> {
        self.tasks
            .enqueue(task)
            .await
            .map_err(|e| GovernanceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn load_entity(&self, entity_id: Uuid) -> GovernanceResult<Entity> {
        self.store
            .entity(entity_id)
            .await?
            .ok_or(GovernanceError::EntityNotFound)
    }

    /// Write a membership change that retires `excluding_user` from the
    /// top role, refusing if no replacement admin would remain. The
    /// store performs the check and the write as one atomic step.
    async fn put_guarded(
        &self,
        membership: Membership<R>,
        excluding_user: Uuid,
        action: MemberAction,
    ) -> GovernanceResult<()> {
        let entity_id = membership.entity_id;
        if self
            .store
            .put_membership_guarded(membership, excluding_user)
            .await?
        {
            Ok(())
        } else {
            Err(GovernanceError::LastAdminViolation { entity_id, action })
        }
    }

    /// Create an entity; the caller becomes its sole top-role member.
    pub async fn create_entity(
        &self,
        caller: Caller,
        name: impl Into<String>,
        privacy: Privacy,
    ) -> GovernanceResult<Entity> {
        let user_id = caller.id()?;
        let entity = Entity::new(name, user_id, privacy);

        let creator = Membership::new(entity.id, user_id, R::top(), MembershipStatus::Active);
        self.store.put_entity(entity.clone()).await?;
        self.store.put_membership(creator).await?;

        info!(entity_id = %entity.id, owner_id = %user_id, "entity created");
        Ok(entity)
    }

    /// Apply a sparse update to an entity.
    pub async fn update_entity(
        &self,
        caller: Caller,
        entity_id: Uuid,
        patch: EntityPatch,
    ) -> GovernanceResult<Entity> {
        let mut entity = self.load_entity(entity_id).await?;
        self.gate()
            .authorize_action(caller, entity_id, MemberAction::UpdateEntity)
            .await?;

        patch.apply(&mut entity);
        self.store.put_entity(entity.clone()).await?;

        info!(entity_id = %entity_id, "entity updated");
        Ok(entity)
    }

    /// Delete an entity and schedule the purge of its content.
    pub async fn delete_entity(&self, caller: Caller, entity_id: Uuid) -> GovernanceResult<()> {
        self.load_entity(entity_id).await?;
        self.gate()
            .authorize_action(caller, entity_id, MemberAction::DeleteEntity)
            .await?;

        self.store.delete_entity(entity_id).await?;
        self.enqueue(
            Task::new(
                TaskKind::PurgeEntityContent,
                json!({ "entity_id": entity_id }),
            )
            .with_correlation_id(entity_id.to_string()),
        )
        .await?;

        info!(entity_id = %entity_id, "entity deleted");
        Ok(())
    }

    /// Join an entity without an invitation.
    ///
    /// Public entities admit immediately; restricted entities record a
    /// join request unless auto-approval is on; private entities refuse.
    pub async fn join_entity(&self, caller: Caller, entity_id: Uuid) -> GovernanceResult<JoinOutcome> {
        let user_id = caller.id()?;
        let entity = self.load_entity(entity_id).await?;

        let prior = self.store.membership(entity_id, user_id).await?;
        let outcome = decide_join(&entity, prior.as_ref().map(|m| m.status))?;

        // Reuse the prior record so join history survives a rejoin.
        let mut membership = prior
            .unwrap_or_else(|| Membership::new(entity_id, user_id, R::lowest(), outcome.status()));
        membership.set_role(R::lowest());
        membership.set_status(outcome.status());
        self.store.put_membership(membership).await?;

        // A direct join settles any invitation that was still open, so
        // the offer cannot be replayed against the live membership.
        if outcome == JoinOutcome::Joined {
            if let Some(mut invitation) = self.store.invitation_for(entity_id, user_id).await? {
                if invitation.status == InvitationStatus::Pending {
                    invitation.mark_accepted();
                    self.store.put_invitation(invitation).await?;
                }
            }
        }

        info!(entity_id = %entity_id, user_id = %user_id, outcome = ?outcome, "join attempt settled");
        Ok(outcome)
    }

    /// Leave an entity, or withdraw a pending join request.
    ///
    /// A top-role member may not leave while they are the entity's only
    /// active top-role member.
    pub async fn leave_entity(&self, caller: Caller, entity_id: Uuid) -> GovernanceResult<()> {
        let user_id = caller.id()?;
        self.load_entity(entity_id).await?;

        let mut membership = self
            .store
            .membership(entity_id, user_id)
            .await?
            .ok_or(GovernanceError::NotAMember)?;

        match membership.status {
            MembershipStatus::Active | MembershipStatus::Requested => {}
            MembershipStatus::Blocked => return Err(GovernanceError::Blocked),
            _ => return Err(GovernanceError::NotAMember),
        }

        let was_active = membership.is_active();
        let retires_admin = membership.counts_for_succession();
        membership.set_status(MembershipStatus::Removed);
        if retires_admin {
            self.put_guarded(membership, user_id, MemberAction::RemoveMember)
                .await?;
        } else {
            self.store.put_membership(membership).await?;
        }

        if was_active {
            self.enqueue(
                Task::new(
                    TaskKind::PurgeMemberContent,
                    json!({ "entity_id": entity_id, "user_id": user_id }),
                )
                .with_correlation_id(entity_id.to_string()),
            )
            .await?;
        }

        info!(entity_id = %entity_id, user_id = %user_id, "member left");
        Ok(())
    }

    /// Approve a pending join request, activating the membership.
    pub async fn approve_request(
        &self,
        caller: Caller,
        entity_id: Uuid,
        target_user_id: Uuid,
    ) -> GovernanceResult<Membership<R>> {
        self.load_entity(entity_id).await?;
        self.gate()
            .authorize_action(caller, entity_id, MemberAction::ApproveRequest)
            .await?;

        let mut target = self
            .store
            .membership(entity_id, target_user_id)
            .await?
            .ok_or(GovernanceError::MembershipNotFound)?;

        match target.status {
            MembershipStatus::Requested => {}
            MembershipStatus::Active => return Err(GovernanceError::AlreadyMember),
            _ => return Err(GovernanceError::MembershipNotFound),
        }

        target.set_status(MembershipStatus::Active);
        self.store.put_membership(target.clone()).await?;

        info!(entity_id = %entity_id, user_id = %target_user_id, "join request approved");
        Ok(target)
    }

    /// Reject a pending join request.
    pub async fn reject_request(
        &self,
        caller: Caller,
        entity_id: Uuid,
        target_user_id: Uuid,
    ) -> GovernanceResult<()> {
        self.load_entity(entity_id).await?;
        self.gate()
            .authorize_action(caller, entity_id, MemberAction::ApproveRequest)
            .await?;

        let mut target = self
            .store
            .membership(entity_id, target_user_id)
            .await?
            .ok_or(GovernanceError::MembershipNotFound)?;

        match target.status {
            MembershipStatus::Requested => {}
            MembershipStatus::Active => return Err(GovernanceError::AlreadyMember),
            _ => return Err(GovernanceError::MembershipNotFound),
        }

        target.set_status(MembershipStatus::Removed);
        self.store.put_membership(target).await?;

        info!(entity_id = %entity_id, user_id = %target_user_id, "join request rejected");
        Ok(())
    }

    /// Invite a user to the entity.
    ///
    /// Requires the inviting threshold, unless the entity's settings
    /// open invitations to all active members. Re-inviting after a
    /// decline or expiry re-arms the existing invitation.
    pub async fn invite_member(
        &self,
        caller: Caller,
        entity_id: Uuid,
        target_user_id: Uuid,
    ) -> GovernanceResult<Invitation> {
        let entity = self.load_entity(entity_id).await?;

        let threshold = if entity.settings.allow_member_invites {
            R::lowest()
        } else {
            R::min_role(MemberAction::InviteMember)
        };
        let inviter = self.gate().authorize(caller, entity_id, threshold).await?;

        let target = self.store.membership(entity_id, target_user_id).await?;
        match target.as_ref().map(|m| m.status) {
            Some(MembershipStatus::Active) => return Err(GovernanceError::AlreadyMember),
            Some(MembershipStatus::Invited) => return Err(GovernanceError::InviteAlreadyPending),
            Some(MembershipStatus::Blocked) => return Err(GovernanceError::Blocked),
            Some(MembershipStatus::Requested) => {
                return Err(GovernanceError::RequestAlreadyPending)
            }
            Some(MembershipStatus::Removed) | None => {}
        }

        let now = chrono::Utc::now();
        let invitation = match self.store.invitation_for(entity_id, target_user_id).await? {
            Some(existing) if existing.is_pending(now) => {
                return Err(GovernanceError::InviteAlreadyPending)
            }
            Some(mut existing) => {
                existing.rearm(inviter.user_id);
                existing
            }
            None => Invitation::new(entity_id, target_user_id, inviter.user_id),
        };
        self.store.put_invitation(invitation.clone()).await?;

        let mut record = target.unwrap_or_else(|| {
            Membership::new(
                entity_id,
                target_user_id,
                R::lowest(),
                MembershipStatus::Invited,
            )
        });
        record.invited_by = Some(inviter.user_id);
        record.set_role(R::lowest());
        record.set_status(MembershipStatus::Invited);
        self.store.put_membership(record).await?;

        self.enqueue(
            Task::new(
                TaskKind::NotifyInvitation,
                json!({
                    "invitation_id": invitation.id,
                    "entity_id": entity_id,
                    "invited_user_id": target_user_id,
                }),
            )
            .with_correlation_id(entity_id.to_string()),
        )
        .await?;

        info!(entity_id = %entity_id, invited = %target_user_id, "invitation issued");
        Ok(invitation)
    }

    /// Accept an invitation, activating membership at the lowest role.
    pub async fn accept_invitation(
        &self,
        caller: Caller,
        invitation_id: Uuid,
    ) -> GovernanceResult<Membership<R>> {
        let user_id = caller.id()?;

        let mut invitation = self
            .store
            .invitation(invitation_id)
            .await?
            .ok_or(GovernanceError::InvitationNotFound)?;

        if invitation.invited_user_id != user_id {
            return Err(GovernanceError::NotYourInvitation);
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(GovernanceError::InvitationNotPending);
        }
        if invitation.is_expired(chrono::Utc::now()) {
            return Err(GovernanceError::InvitationExpired);
        }
        if self.store.entity(invitation.entity_id).await?.is_none() {
            return Err(GovernanceError::EntityGone);
        }

        let entity_id = invitation.entity_id;
        let prior = self.store.membership(entity_id, user_id).await?;
        if let Some(existing) = &prior {
            // Already joined through another path; accepting must not
            // reset the role they hold by now.
            if existing.is_active() {
                return Err(GovernanceError::AlreadyMember);
            }
            if existing.status == MembershipStatus::Blocked {
                return Err(GovernanceError::Blocked);
            }
        }

        invitation.mark_accepted();
        self.store.put_invitation(invitation.clone()).await?;

        let mut membership = prior.unwrap_or_else(|| {
            Membership::new(entity_id, user_id, R::lowest(), MembershipStatus::Invited)
        });
        membership.invited_by = Some(invitation.invited_by);
        membership.set_role(R::lowest());
        membership.set_status(MembershipStatus::Active);
        self.store.put_membership(membership.clone()).await?;

        info!(entity_id = %entity_id, user_id = %user_id, "invitation accepted");
        Ok(membership)
    }

    /// Decline an invitation.
    pub async fn decline_invitation(
        &self,
        caller: Caller,
        invitation_id: Uuid,
    ) -> GovernanceResult<()> {
        let user_id = caller.id()?;

        let mut invitation = self
            .store
            .invitation(invitation_id)
            .await?
            .ok_or(GovernanceError::InvitationNotFound)?;

        if invitation.invited_user_id != user_id {
            return Err(GovernanceError::NotYourInvitation);
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(GovernanceError::InvitationNotPending);
        }
        if invitation.is_expired(chrono::Utc::now()) {
            return Err(GovernanceError::InvitationExpired);
        }

        invitation.mark_declined();
        let entity_id = invitation.entity_id;
        self.store.put_invitation(invitation).await?;

        if let Some(mut membership) = self.store.membership(entity_id, user_id).await? {
            if membership.status == MembershipStatus::Invited {
                membership.set_status(MembershipStatus::Removed);
                self.store.put_membership(membership).await?;
            }
        }

        info!(entity_id = %entity_id, user_id = %user_id, "invitation declined");
        Ok(())
    }

    /// Remove a member from the entity.
    ///
    /// A self-targeted removal is a leave and follows the leave rules.
    /// The caller cannot remove someone who outranks them, and the last
    /// active top-role member cannot be removed.
    pub async fn remove_member(
        &self,
        caller: Caller,
        entity_id: Uuid,
        target_user_id: Uuid,
    ) -> GovernanceResult<()> {
        if caller.id()? == target_user_id {
            return self.leave_entity(caller, entity_id).await;
        }

        self.load_entity(entity_id).await?;
        let actor = self
            .gate()
            .authorize_action(caller, entity_id, MemberAction::RemoveMember)
            .await?;

        let mut target = self
            .store
            .membership(entity_id, target_user_id)
            .await?
            .ok_or(GovernanceError::MembershipNotFound)?;
        if target.status == MembershipStatus::Removed {
            return Err(GovernanceError::MembershipNotFound);
        }
        if target.role.outranks(actor.role) {
            return Err(GovernanceError::RankOutranked);
        }

        let was_active = target.is_active();
        let retires_admin = target.counts_for_succession();
        target.set_status(MembershipStatus::Removed);
        if retires_admin {
            self.put_guarded(target, target_user_id, MemberAction::RemoveMember)
                .await?;
        } else {
            self.store.put_membership(target).await?;
        }

        if was_active {
            self.enqueue(
                Task::new(
                    TaskKind::PurgeMemberContent,
                    json!({ "entity_id": entity_id, "user_id": target_user_id }),
                )
                .with_correlation_id(entity_id.to_string()),
            )
            .await?;
        }

        info!(entity_id = %entity_id, user_id = %target_user_id, "member removed");
        Ok(())
    }

    /// Change an active member's role.
    ///
    /// The caller cannot touch someone who outranks them, nor grant a
    /// role above their own. Demoting the last active top-role member is
    /// refused.
    pub async fn update_member_role(
        &self,
        caller: Caller,
        entity_id: Uuid,
        target_user_id: Uuid,
        new_role: R,
    ) -> GovernanceResult<Membership<R>> {
        self.load_entity(entity_id).await?;
        let actor = self
            .gate()
            .authorize_action(caller, entity_id, MemberAction::UpdateRole)
            .await?;

        let mut target = self
            .store
            .membership(entity_id, target_user_id)
            .await?
            .filter(|m| m.is_active())
            .ok_or(GovernanceError::MembershipNotFound)?;

        if target.role.outranks(actor.role) {
            return Err(GovernanceError::RankOutranked);
        }
        if new_role.outranks(actor.role) {
            return Err(GovernanceError::InsufficientRole);
        }

        let demoting_from_top = target.counts_for_succession() && !new_role.is_top();
        target.set_role(new_role);
        if demoting_from_top {
            self.put_guarded(target.clone(), target_user_id, MemberAction::UpdateRole)
                .await?;
        } else {
            self.store.put_membership(target.clone()).await?;
        }

        info!(
            entity_id = %entity_id,
            user_id = %target_user_id,
            role = new_role.as_str(),
            "member role updated"
        );
        Ok(target)
    }

    /// Block a user from the entity.
    ///
    /// Works on members and non-members alike; a record is created for
    /// the latter so the bar persists. Blocking the last active top-role
    /// member is refused.
    pub async fn block_member(
        &self,
        caller: Caller,
        entity_id: Uuid,
        target_user_id: Uuid,
    ) -> GovernanceResult<()> {
        self.load_entity(entity_id).await?;
        let actor = self
            .gate()
            .authorize_action(caller, entity_id, MemberAction::BlockMember)
            .await?;

        let target = self.store.membership(entity_id, target_user_id).await?;

        if let Some(ref existing) = target {
            if existing.role.outranks(actor.role) {
                return Err(GovernanceError::RankOutranked);
            }
        }

        let retires_admin = target
            .as_ref()
            .map_or(false, |m| m.counts_for_succession());
        let mut record = target.unwrap_or_else(|| {
            Membership::new(
                entity_id,
                target_user_id,
                R::lowest(),
                MembershipStatus::Blocked,
            )
        });
        record.set_status(MembershipStatus::Blocked);
        if retires_admin {
            self.put_guarded(record, target_user_id, MemberAction::BlockMember)
                .await?;
        } else {
            self.store.put_membership(record).await?;
        }

        info!(entity_id = %entity_id, user_id = %target_user_id, "member blocked");
        Ok(())
    }
}
