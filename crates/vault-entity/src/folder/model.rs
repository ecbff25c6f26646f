//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::owner::Owner;

/// A folder in the vault hierarchy.
///
/// Folders are never soft-deleted and carry no `updated_at`; renames
/// change the name in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Folder name. Siblings may share names.
    pub name: String,
    /// Parent folder ID (null for root folders).
    pub parent_id: Option<Uuid>,
    /// The folder owner.
    pub owner: Owner,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// Create a new folder with a fresh id.
    pub fn new(name: impl Into<String>, owner: Owner, parent_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            parent_id,
            owner,
            created_at: crate::timestamp_now(),
        }
    }

    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
