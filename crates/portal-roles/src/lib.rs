//! # Portal Role Hierarchies
//!
//! This crate provides the role hierarchies for the Portal platform,
//! shared by every entity kind that carries memberships (groups,
//! organizations).
//!
//! ## Overview
//!
//! The portal-roles crate handles:
//! - **Roles**: Ordered role sets per entity kind
//! - **Actions**: The governed operations members can attempt
//! - **Thresholds**: The minimum role required per action
//!
//! ## Architecture
//!
//! ```text
//! Role (trait)
//!   ├─ GroupRole:        member < moderator < admin
//!   └─ OrganizationRole: student < viewer < editor < admin < owner
//!
//! permits(role, action) == role >= min_role(action)
//! ```
//!
//! Everything here is pure data: no state, no I/O, no runtime failure
//! modes beyond `parse` returning `None` for unknown strings.
//!
//! ## Usage
//!
//! ```rust
//! use portal_roles::{GroupRole, MemberAction, Role};
//!
//! assert!(GroupRole::Moderator.permits(MemberAction::RemoveMember));
//! assert!(GroupRole::Admin.outranks(GroupRole::Moderator));
//! assert_eq!(GroupRole::top(), GroupRole::Admin);
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `portal-governance`: the membership and invitation engine, generic
//!   over [`Role`]

pub mod actions;
pub mod group;
pub mod hierarchy;
pub mod organization;

// Re-export main types for convenience
pub use actions::MemberAction;
pub use group::GroupRole;
pub use hierarchy::Role;
pub use organization::OrganizationRole;
