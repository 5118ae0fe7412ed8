//! Entity settings
//!
//! This module provides the typed settings object carried by every entity,
//! together with an explicit partial-update type. Settings arrive from
//! clients as sparse patches; the merge semantics live here instead of in
//! an untyped key bag.

use serde::{Deserialize, Serialize};

/// Behavior settings for an entity.
///
/// These control who may post, who may invite, and how join requests are
/// handled. Every field has a serde default so stored settings survive
/// schema additions.
///
/// # Examples
///
/// ```
/// use portal_governance::settings::EntitySettings;
///
/// let settings = EntitySettings::default();
/// assert!(settings.allow_member_posts);
/// assert!(!settings.allow_member_invites);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySettings {
    /// Allow plain members to create posts
    #[serde(default = "default_true")]
    pub allow_member_posts: bool,

    /// Allow plain members to invite users
    #[serde(default)]
    pub allow_member_invites: bool,

    /// List the entity in the public directory
    #[serde(default = "default_true")]
    pub show_in_directory: bool,

    /// Hold member posts for moderation
    #[serde(default)]
    pub moderation_enabled: bool,

    /// Activate join requests immediately instead of queueing them
    #[serde(default)]
    pub auto_approve_members: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EntitySettings {
    fn default() -> Self {
        Self {
            allow_member_posts: true,
            allow_member_invites: false,
            show_in_directory: true,
            moderation_enabled: false,
            auto_approve_members: false,
        }
    }
}

/// A sparse update to [`EntitySettings`].
///
/// Only fields that are `Some` are written; everything else keeps its
/// current value. This replaces ad-hoc merging of settings maps with one
/// explicit, testable merge.
///
/// # Examples
///
/// ```
/// use portal_governance::settings::{EntitySettings, EntitySettingsPatch};
///
/// let mut settings = EntitySettings::default();
/// let patch = EntitySettingsPatch {
///     allow_member_invites: Some(true),
///     ..Default::default()
/// };
/// patch.apply(&mut settings);
/// assert!(settings.allow_member_invites);
/// assert!(settings.allow_member_posts); // untouched
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySettingsPatch {
    /// New value for `allow_member_posts`, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_member_posts: Option<bool>,

    /// New value for `allow_member_invites`, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_member_invites: Option<bool>,

    /// New value for `show_in_directory`, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_directory: Option<bool>,

    /// New value for `moderation_enabled`, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation_enabled: Option<bool>,

    /// New value for `auto_approve_members`, if changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_approve_members: Option<bool>,
}

impl EntitySettingsPatch {
    /// Apply this patch to a settings object in place.
    pub fn apply(&self, settings: &mut EntitySettings) {
        if let Some(v) = self.allow_member_posts {
            settings.allow_member_posts = v;
        }
        if let Some(v) = self.allow_member_invites {
            settings.allow_member_invites = v;
        }
        if let Some(v) = self.show_in_directory {
            settings.show_in_directory = v;
        }
        if let Some(v) = self.moderation_enabled {
            settings.moderation_enabled = v;
        }
        if let Some(v) = self.auto_approve_members {
            settings.auto_approve_members = v;
        }
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.allow_member_posts.is_none()
            && self.allow_member_invites.is_none()
            && self.show_in_directory.is_none()
            && self.moderation_enabled.is_none()
            && self.auto_approve_members.is_none()
    }
}
