//! Admin-succession guard
//!
//! An entity with members must always have at least one active member
//! holding the hierarchy's top role. Any mutation that would strip the
//! last such member of that standing (leave, removal, demotion, block)
//! is refused.
//!
//! The predicate here is pure; atomicity lives in the store. Backends
//! evaluate it inside [`MembershipStore::put_membership_guarded`], in
//! the same atomic step as the write it protects, so two concurrent
//! step-downs cannot both observe a replacement.
//!
//! [`MembershipStore::put_membership_guarded`]:
//! crate::store::MembershipStore::put_membership_guarded

use portal_roles::Role;
use uuid::Uuid;

use crate::membership::Membership;

/// Check whether any active top-role member other than `excluding_user`
/// exists among `memberships`.
pub fn replacement_admin_exists<'a, R, I>(memberships: I, excluding_user: Uuid) -> bool
where
    R: Role,
    I: IntoIterator<Item = &'a Membership<R>>,
{
    memberships
        .into_iter()
        .any(|m| m.user_id != excluding_user && m.counts_for_succession())
}
