//! Storage abstraction for governance records
//!
//! The engine reads and writes entities, memberships, and invitations
//! through [`MembershipStore`]. Every method is individually atomic, and
//! the one decision that must not race (the admin-succession check) is
//! folded into the write it protects: `put_membership_guarded` evaluates
//! the replacement check and applies the write as one atomic step, so no
//! interleaving of concurrent operations can retire two last admins.
//! The bundled [`MemoryStore`] implements this with a single lock; a
//! database backend would use a serializable transaction per call.

use std::collections::HashMap;

use async_trait::async_trait;
use portal_roles::Role;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::GovernanceResult;
use crate::guard::replacement_admin_exists;
use crate::invitation::Invitation;
use crate::membership::Membership;

/// Persistence contract for governance records.
///
/// Memberships are keyed by (entity, user): `put_membership` upserts on
/// that pair, so at most one record per pair ever exists. Invitations are
/// keyed by id, with `invitation_for` serving the per-user uniqueness
/// lookup.
#[async_trait]
pub trait MembershipStore<R: Role>: Send + Sync {
    /// Load an entity by id.
    async fn entity(&self, entity_id: Uuid) -> GovernanceResult<Option<Entity>>;

    /// Insert or replace an entity.
    async fn put_entity(&self, entity: Entity) -> GovernanceResult<()>;

    /// Delete an entity. Membership and invitation records survive for
    /// the cascade worker to clean up.
    async fn delete_entity(&self, entity_id: Uuid) -> GovernanceResult<()>;

    /// Load the membership record for a user in an entity, in any status.
    async fn membership(
        &self,
        entity_id: Uuid,
        user_id: Uuid,
    ) -> GovernanceResult<Option<Membership<R>>>;

    /// Insert or replace the membership record for (entity, user).
    async fn put_membership(&self, membership: Membership<R>) -> GovernanceResult<()>;

    /// Write `membership` only if another active top-role member than
    /// `excluding_user` exists for the entity. Returns whether the
    /// write was applied.
    ///
    /// The check and the write must be one atomic step: backends
    /// evaluate [`replacement_admin_exists`] against the same view the
    /// write commits into. Succession-sensitive mutations go through
    /// this method instead of a separate read plus `put_membership`.
    ///
    /// [`replacement_admin_exists`]: crate::guard::replacement_admin_exists
    async fn put_membership_guarded(
        &self,
        membership: Membership<R>,
        excluding_user: Uuid,
    ) -> GovernanceResult<bool>;

    /// Load every membership record for an entity, in any status.
    async fn memberships(&self, entity_id: Uuid) -> GovernanceResult<Vec<Membership<R>>>;

    /// Load an invitation by id.
    async fn invitation(&self, invitation_id: Uuid) -> GovernanceResult<Option<Invitation>>;

    /// Load the invitation addressed to a user for an entity, if any.
    async fn invitation_for(
        &self,
        entity_id: Uuid,
        invited_user_id: Uuid,
    ) -> GovernanceResult<Option<Invitation>>;

    /// Insert or replace an invitation.
    async fn put_invitation(&self, invitation: Invitation) -> GovernanceResult<()>;
}

#[derive(Default)]
struct Tables<R> {
    entities: HashMap<Uuid, Entity>,
    memberships: HashMap<(Uuid, Uuid), Membership<R>>,
    invitations: HashMap<Uuid, Invitation>,
}

/// In-memory store for testing and development.
///
/// All three tables live behind one lock, which gives each call a
/// consistent snapshot.
pub struct MemoryStore<R> {
    tables: RwLock<Tables<R>>,
}

impl<R: Role> MemoryStore<R> {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                entities: HashMap::new(),
                memberships: HashMap::new(),
                invitations: HashMap::new(),
            }),
        }
    }
}

impl<R: Role> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Role> MembershipStore<R> for MemoryStore<R> {
    async fn entity(&self, entity_id: Uuid) -> GovernanceResult<Option<Entity>> {
        let tables = self.tables.read().await;
        Ok(tables.entities.get(&entity_id).cloned())
    }

    async fn put_entity(&self, entity: Entity) -> GovernanceResult<()> {
        let mut tables = self.tables.write().await;
        tables.entities.insert(entity.id, entity);
        Ok(())
    }

    async fn delete_entity(&self, entity_id: Uuid) -> GovernanceResult<()> {
        let mut tables = self.tables.write().await;
        tables.entities.remove(&entity_id);
        Ok(())
    }

    async fn membership(
        &self,
        entity_id: Uuid,
        user_id: Uuid,
    ) -> GovernanceResult<Option<Membership<R>>> {
        let tables = self.tables.read().await;
        Ok(tables.memberships.get(&(entity_id, user_id)).cloned())
    }

    async fn put_membership(&self, membership: Membership<R>) -> GovernanceResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .memberships
            .insert((membership.entity_id, membership.user_id), membership);
        Ok(())
    }

    async fn put_membership_guarded(
        &self,
        membership: Membership<R>,
        excluding_user: Uuid,
    ) -> GovernanceResult<bool> {
        // One write lock spans the check and the write.
        let mut tables = self.tables.write().await;
        let remaining = tables
            .memberships
            .values()
            .filter(|m| m.entity_id == membership.entity_id);
        if !replacement_admin_exists(remaining, excluding_user) {
            return Ok(false);
        }
        tables
            .memberships
            .insert((membership.entity_id, membership.user_id), membership);
        Ok(true)
    }

    async fn memberships(&self, entity_id: Uuid) -> GovernanceResult<Vec<Membership<R>>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .filter(|m| m.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn invitation(&self, invitation_id: Uuid) -> GovernanceResult<Option<Invitation>> {
        let tables = self.tables.read().await;
        Ok(tables.invitations.get(&invitation_id).cloned())
    }

    async fn invitation_for(
        &self,
        entity_id: Uuid,
        invited_user_id: Uuid,
    ) -> GovernanceResult<Option<Invitation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .invitations
            .values()
            .find(|i| i.entity_id == entity_id && i.invited_user_id == invited_user_id)
            .cloned())
    }

    async fn put_invitation(&self, invitation: Invitation) -> GovernanceResult<()> {
        let mut tables = self.tables.write().await;
        tables.invitations.insert(invitation.id, invitation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Privacy;
    use crate::membership::MembershipStatus;
    use portal_roles::GroupRole;

    #[tokio::test]
    async fn test_entity_round_trip() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let entity = Entity::new("Chess Club", Uuid::now_v7(), Privacy::Public);
        let entity_id = entity.id;

        store.put_entity(entity).await.unwrap();
        let loaded = store.entity(entity_id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Chess Club");

        store.delete_entity(entity_id).await.unwrap();
        assert!(store.entity(entity_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_membership_upserts_on_entity_user_pair() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let entity_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();

        let first = Membership::new(
            entity_id,
            user_id,
            GroupRole::Member,
            MembershipStatus::Requested,
        );
        store.put_membership(first.clone()).await.unwrap();

        let mut second = first;
        second.set_status(MembershipStatus::Active);
        store.put_membership(second).await.unwrap();

        let all = store.memberships(entity_id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn test_guarded_put_refuses_without_replacement() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let entity_id = Uuid::now_v7();

        let mut admin = Membership::new(
            entity_id,
            Uuid::now_v7(),
            GroupRole::Admin,
            MembershipStatus::Active,
        );
        store.put_membership(admin.clone()).await.unwrap();

        // Sole admin: the guarded write refuses and leaves the record
        // untouched.
        let mut stepped_down = admin.clone();
        stepped_down.set_status(MembershipStatus::Removed);
        let written = store
            .put_membership_guarded(stepped_down.clone(), admin.user_id)
            .await
            .unwrap();
        assert!(!written);
        let record = store
            .membership(entity_id, admin.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, MembershipStatus::Active);

        // With a second active admin the same write goes through.
        let second = Membership::new(
            entity_id,
            Uuid::now_v7(),
            GroupRole::Admin,
            MembershipStatus::Active,
        );
        store.put_membership(second).await.unwrap();
        let written = store
            .put_membership_guarded(stepped_down, admin.user_id)
            .await
            .unwrap();
        assert!(written);
        admin = store
            .membership(entity_id, admin.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.status, MembershipStatus::Removed);
    }

    #[tokio::test]
    async fn test_invitation_lookup_by_target() {
        let store: MemoryStore<GroupRole> = MemoryStore::new();
        let entity_id = Uuid::now_v7();
        let invited = Uuid::now_v7();

        let invitation = Invitation::new(entity_id, invited, Uuid::now_v7());
        let invitation_id = invitation.id;
        store.put_invitation(invitation).await.unwrap();

        let found = store.invitation_for(entity_id, invited).await.unwrap();
        assert_eq!(found.map(|i| i.id), Some(invitation_id));

        let miss = store.invitation_for(entity_id, Uuid::now_v7()).await.unwrap();
        assert!(miss.is_none());
    }
}
