//! Invitation domain models
//!
//! This module provides the invitation record: a pending, targeted offer
//! of membership. At most one pending invitation exists per
//! (entity, invited user); re-inviting after a decline or expiry re-arms
//! the existing record instead of stacking duplicates.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an invitation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Awaiting the invited user's response
    Pending,

    /// Accepted; a membership was created
    Accepted,

    /// Declined by the invited user
    Declined,
}

impl InvitationStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }
}

/// A pending offer of membership to a specific user.
///
/// Expiry is passive: nothing rewrites an invitation when its window
/// lapses. An expired `pending` invitation is simply invalid the next
/// time it is read, and a re-invite re-arms it.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use chrono::Utc;
/// use portal_governance::{Invitation, InvitationStatus};
///
/// let invitation = Invitation::new(Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
/// assert_eq!(invitation.status, InvitationStatus::Pending);
/// assert!(invitation.is_pending(Utc::now()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// Entity the invitation is for
    pub entity_id: Uuid,

    /// User being invited
    pub invited_user_id: Uuid,

    /// User who issued the invitation
    pub invited_by: Uuid,

    /// Opaque token included in the invitation link
    pub token: String,

    /// Lifecycle status
    pub status: InvitationStatus,

    /// When the invitation was created (or last re-armed)
    pub created_at: DateTime<Utc>,

    /// When the invited user responded
    pub responded_at: Option<DateTime<Utc>>,

    /// When the invitation lapses; `None` means it never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Default validity window for a new invitation.
    pub const DEFAULT_TTL_DAYS: i64 = 7;

    /// Creates a new pending invitation with the default expiry window.
    pub fn new(entity_id: Uuid, invited_user_id: Uuid, invited_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            entity_id,
            invited_user_id,
            invited_by,
            token: Self::generate_token(),
            status: InvitationStatus::Pending,
            created_at: now,
            responded_at: None,
            expires_at: Some(now + Duration::days(Self::DEFAULT_TTL_DAYS)),
        }
    }

    /// Remove the expiry window.
    pub fn without_expiry(mut self) -> Self {
        self.expires_at = None;
        self
    }

    /// Check if the invitation has lapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Check if the invitation can still be accepted at `now`.
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }

    /// Re-arm a declined or expired invitation for a fresh offer.
    ///
    /// Keeps the record (and its id) but resets the token, inviter,
    /// status, and expiry window.
    pub fn rearm(&mut self, invited_by: Uuid) {
        let now = Utc::now();
        self.invited_by = invited_by;
        self.token = Self::generate_token();
        self.status = InvitationStatus::Pending;
        self.created_at = now;
        self.responded_at = None;
        self.expires_at = Some(now + Duration::days(Self::DEFAULT_TTL_DAYS));
    }

    /// Mark the invitation accepted.
    pub fn mark_accepted(&mut self) {
        self.status = InvitationStatus::Accepted;
        self.responded_at = Some(Utc::now());
    }

    /// Mark the invitation declined.
    pub fn mark_declined(&mut self) {
        self.status = InvitationStatus::Declined;
        self.responded_at = Some(Utc::now());
    }

    /// Generate an opaque invitation token.
    fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }
}
