//! Entity domain models
//!
//! This module provides the Entity type: the container users join as
//! members. A group and an organization are both entities; what differs
//! between them is the role hierarchy, which lives in `portal-roles`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::{EntitySettings, EntitySettingsPatch};

/// Who can see and join an entity.
///
/// Privacy decides the outcome of an unmediated join attempt:
/// public → active membership, restricted → join request,
/// private → rejected (invitation only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    /// Anyone may join directly
    Public,

    /// Visible; joining creates a request that a moderator approves
    Restricted,

    /// Invitation only
    Private,
}

impl Privacy {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Restricted => "restricted",
            Privacy::Private => "private",
        }
    }

    /// Parse from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(Privacy::Public),
            "restricted" => Some(Privacy::Restricted),
            "private" => Some(Privacy::Private),
            _ => None,
        }
    }
}

impl Default for Privacy {
    fn default() -> Self {
        Privacy::Private
    }
}

/// An entity users belong to: a group or an organization.
///
/// Creating an entity also inserts the creator as its sole top-role
/// active member, in the same operation; an entity with members is never
/// without an administrator.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use portal_governance::{Entity, Privacy};
///
/// let owner_id = Uuid::now_v7();
/// let entity = Entity::new("Rust Study Circle", owner_id, Privacy::Public);
/// assert_eq!(entity.slug, "rust-study-circle");
/// assert!(!entity.is_archived);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug derived from the name
    pub slug: String,

    /// Optional description
    pub description: Option<String>,

    /// Avatar/logo URL
    pub avatar_url: Option<String>,

    /// Who can see and join
    pub privacy: Privacy,

    /// User who created the entity
    pub owner_id: Uuid,

    /// Whether the entity is archived (hidden, read-only)
    pub is_archived: bool,

    /// Behavior settings
    pub settings: EntitySettings,

    /// When the entity was created
    pub created_at: DateTime<Utc>,

    /// When the entity was last updated
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Creates a new entity with default settings.
    ///
    /// # Arguments
    ///
    /// * `name` - The entity name; the slug is derived from it
    /// * `owner_id` - The creating user
    /// * `privacy` - Who can see and join
    pub fn new(name: impl Into<String>, owner_id: Uuid, privacy: Privacy) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            slug: Self::slug_from(&name),
            name,
            description: None,
            avatar_url: None,
            privacy,
            owner_id,
            is_archived: false,
            settings: EntitySettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the settings.
    pub fn with_settings(mut self, settings: EntitySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Derive a URL-friendly slug from a name.
    ///
    /// Lowercases, maps runs of non-alphanumeric characters to single
    /// hyphens, and trims leading/trailing hyphens.
    pub fn slug_from(name: &str) -> String {
        let mut slug = String::with_capacity(name.len());
        let mut last_was_hyphen = true;
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.extend(c.to_lowercase());
                last_was_hyphen = false;
            } else if !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        slug
    }
}

/// A sparse update to an [`Entity`].
///
/// Only fields that are `Some` are written. Settings changes nest their
/// own sparse patch so a client updating one flag does not clobber the
/// rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityPatch {
    /// New name (the slug is re-derived)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// New privacy mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,

    /// Archive or unarchive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,

    /// Sparse settings update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<EntitySettingsPatch>,
}

impl EntityPatch {
    /// Apply this patch to an entity in place, bumping `updated_at`.
    pub fn apply(&self, entity: &mut Entity) {
        if let Some(ref name) = self.name {
            entity.slug = Entity::slug_from(name);
            entity.name = name.clone();
        }
        if let Some(ref description) = self.description {
            entity.description = Some(description.clone());
        }
        if let Some(ref avatar_url) = self.avatar_url {
            entity.avatar_url = Some(avatar_url.clone());
        }
        if let Some(privacy) = self.privacy {
            entity.privacy = privacy;
        }
        if let Some(is_archived) = self.is_archived {
            entity.is_archived = is_archived;
        }
        if let Some(ref settings) = self.settings {
            settings.apply(&mut entity.settings);
        }
        entity.updated_at = Utc::now();
    }
}
