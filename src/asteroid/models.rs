//! Asteroid models and DTOs
//!
//! An asteroid is a short user-authored note. It is stored twice: as a full
//! document (content, ownership, lifecycle) and as a lightweight graph node
//! carrying only what link topology needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Documents
// ============================================================================

/// A note as held by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: Uuid,
    /// Active flag; `false` means logically deleted
    pub state: bool,
    pub author_id: Uuid,
    /// Shown in the owner's top-level listing
    pub hub: bool,
    /// Free-form type tag
    pub kind: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asteroid {
    /// Build a fresh, active asteroid owned by `author_id`.
    pub fn new(author_id: Uuid, hub: bool, kind: i64, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            state: true,
            author_id,
            hub,
            kind,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Listing view of this asteroid (content dropped).
    pub fn to_item(&self) -> AsteroidItem {
        AsteroidItem {
            id: self.id,
            state: self.state,
            author_id: self.author_id,
            hub: self.hub,
            kind: self.kind,
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Graph projection written alongside the document.
    pub fn to_node(&self) -> AsteroidNode {
        AsteroidNode {
            id: self.id,
            author_id: self.author_id,
            state: self.state,
            created_at: self.created_at,
        }
    }
}

/// Listing projection of an asteroid: every field except `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidItem {
    pub id: Uuid,
    pub state: bool,
    pub author_id: Uuid,
    pub hub: bool,
    pub kind: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AsteroidItem {
    pub fn to_node(&self) -> AsteroidNode {
        AsteroidNode {
            id: self.id,
            author_id: self.author_id,
            state: self.state,
            created_at: self.created_at,
        }
    }
}

// ============================================================================
// Graph projection
// ============================================================================

/// Graph-store projection of an asteroid.
///
/// Written once at creation time and never updated; content edits stay in
/// the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteroidNode {
    pub id: Uuid,
    pub author_id: Uuid,
    pub state: bool,
    pub created_at: DateTime<Utc>,
}

/// Direction of a REFER edge relative to an anchor asteroid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    /// `(other)-[:REFER]->(anchor)`
    From,
    /// `(anchor)-[:REFER]->(other)`
    To,
}

impl fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From => write!(f, "from"),
            Self::To => write!(f, "to"),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Input for [`AsteroidService::create`](super::AsteroidService::create).
///
/// Carries no author; the author is always the acting principal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAsteroidRequest {
    pub hub: bool,
    #[serde(default)]
    pub kind: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Existing asteroids that will point at the new one
    #[serde(default)]
    pub link_from: Vec<Uuid>,
    /// Existing asteroids the new one will point at
    #[serde(default)]
    pub link_to: Vec<Uuid>,
}
