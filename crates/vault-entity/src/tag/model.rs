//! Tag entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::TagStatus;

/// Color given to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#F97316";

/// A tag. Names are globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub status: TagStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Create an active tag with a fresh id.
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        let now = crate::timestamp_now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            color: color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
            status: TagStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TagStatus::Active
    }

    pub fn summary(&self) -> TagSummary {
        TagSummary {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

/// The part of a tag shown next to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

/// A tag with the number of files linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagWithUsage {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub tag: Tag,
    pub usage_count: i64,
}
