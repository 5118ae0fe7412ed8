//! Membership and invitation governance
//!
//! This crate provides the governance engine for entities users belong
//! to: groups and organizations. It covers the membership lifecycle
//! (join, request, invite, accept, leave, remove, block), role changes,
//! sparse entity updates, and deletion with cascading cleanup handed to
//! a durable task queue.
//!
//! Two rules hold everywhere:
//!
//! - every privileged mutation passes the [`gate::AuthorizationGate`]
//! - no mutation may leave an entity without an active top-role member
//!   (the admin-succession guard in [`guard`])
//!
//! The engine is generic over the role hierarchy from `portal-roles`,
//! so the same lifecycle serves both group and organization roles.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use portal_governance::{Caller, GovernanceEngine, MemoryStore, Privacy};
//! use portal_roles::GroupRole;
//! use portal_tasks::MemoryTaskQueue;
//! use uuid::Uuid;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store: MemoryStore<GroupRole> = MemoryStore::new();
//! let tasks = Arc::new(MemoryTaskQueue::new());
//! let engine = GovernanceEngine::new(store, tasks);
//!
//! let alice = Caller::user(Uuid::now_v7());
//! let entity = engine.create_entity(alice, "Chess Club", Privacy::Public).await?;
//!
//! let bob = Caller::user(Uuid::now_v7());
//! engine.join_entity(bob, entity.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod entity;
pub mod error;
pub mod gate;
pub mod guard;
pub mod invitation;
pub mod lifecycle;
pub mod membership;
pub mod settings;
pub mod store;

pub use engine::GovernanceEngine;
pub use entity::{Entity, EntityPatch, Privacy};
pub use error::{GovernanceError, GovernanceResult};
pub use gate::{AuthorizationGate, Caller};
pub use invitation::{Invitation, InvitationStatus};
pub use lifecycle::JoinOutcome;
pub use membership::{Membership, MembershipStatus};
pub use settings::{EntitySettings, EntitySettingsPatch};
pub use store::{MembershipStore, MemoryStore};
