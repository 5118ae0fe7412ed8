//! Role hierarchy abstraction
//!
//! One entity kind (group, organization) has one fixed, ordered set of
//! roles. The hierarchy is pure data: ordering, a lowest/top accessor, and
//! a per-action minimum-role table. The governance engine is generic over
//! this trait so the same state machine serves every entity kind.

use std::fmt::Debug;
use std::hash::Hash;

use crate::actions::MemberAction;

/// A role drawn from a fixed, ordered hierarchy for one entity kind.
///
/// Implementors are small `Copy` enums with explicit discriminants so that
/// `Ord` reflects the hierarchy directly (`member < moderator < admin`).
///
/// Unknown role strings are a caller error surfaced through `parse`
/// returning `None`; there are no runtime failure modes here.
///
/// # Example
///
/// ```
/// use portal_roles::{GroupRole, MemberAction, Role};
///
/// assert!(GroupRole::Moderator.is_at_least(GroupRole::Member));
/// assert!(GroupRole::Moderator.permits(MemberAction::RemoveMember));
/// assert!(!GroupRole::Moderator.permits(MemberAction::UpdateRole));
/// ```
pub trait Role: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The role assigned to members who join or accept an invitation.
    fn lowest() -> Self;

    /// The administrator-equivalent role counted by the succession guard.
    ///
    /// Every entity with members must retain at least one active member
    /// holding this role.
    fn top() -> Self;

    /// The minimum role required to perform `action`.
    fn min_role(action: MemberAction) -> Self;

    /// Lowercase string representation, stable across releases.
    fn as_str(&self) -> &'static str;

    /// Parse a role from its string representation (case-insensitive).
    fn parse(s: &str) -> Option<Self>;

    /// All roles in ascending order.
    fn all() -> Vec<Self>;

    /// Check whether this role meets a threshold.
    fn is_at_least(&self, threshold: Self) -> bool {
        *self >= threshold
    }

    /// Check whether this role is permitted to perform `action`.
    fn permits(&self, action: MemberAction) -> bool {
        self.is_at_least(Self::min_role(action))
    }

    /// Check whether this role strictly outranks another.
    ///
    /// Used for member-targeted actions: a moderator may not remove an
    /// admin, an admin may not change an owner's role.
    fn outranks(&self, other: Self) -> bool {
        *self > other
    }

    /// Check whether this is the succession-guarded top role.
    fn is_top(&self) -> bool {
        *self == Self::top()
    }
}
