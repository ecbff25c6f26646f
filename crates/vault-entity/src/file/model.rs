//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use vault_core::types::Cursor;

use super::category::Category;
use super::status::FileStatus;
use crate::owner::Owner;
use crate::tag::TagSummary;

/// A file stored in the vault.
///
/// The id doubles as the object store key of the file's blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Unique file identifier and blob key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// The folder containing this file (null for root).
    pub folder_id: Option<Uuid>,
    /// File category.
    pub category: Category,
    /// Lifecycle status.
    pub status: FileStatus,
    /// Status the file had when it was trashed, restored on restore.
    #[serde(skip_serializing)]
    pub status_before_trash: Option<FileStatus>,
    /// MIME type of the blob.
    pub mime_type: String,
    /// Size in bytes, equal to the stored blob size.
    pub size_bytes: i64,
    /// The file owner.
    pub owner: Owner,
    /// Whether the file is pinned.
    pub is_pinned: bool,
    /// Name the file was uploaded under.
    pub original_name: String,
    /// Generated preview, itself a `SYSTEM` file row.
    pub thumbnail_id: Option<Uuid>,
    /// When the file was registered.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Whether this row is a generated preview rather than user content.
    pub fn is_preview(&self) -> bool {
        self.category == Category::System
    }

    /// Whether the file sits in the trash.
    pub fn is_trashed(&self) -> bool {
        self.status.is_trashed()
    }

    /// Sort key for keyset pagination.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at, self.id)
    }

    /// Ids of the blobs backing this file: its own and its preview's.
    pub fn blob_keys(&self) -> impl Iterator<Item = Uuid> {
        std::iter::once(self.id).chain(self.thumbnail_id)
    }
}

/// Data required to register a verified upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    /// Id the blob was stored under.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Target folder (None for root).
    pub folder_id: Option<Uuid>,
    /// File category.
    #[serde(default)]
    pub category: Category,
    /// MIME type.
    pub mime_type: String,
    /// Declared size in bytes.
    pub size_bytes: i64,
    /// The file owner.
    pub owner: Owner,
    /// Name the file was uploaded under; defaults to `name`.
    #[serde(default)]
    pub original_name: Option<String>,
    /// Preview row for this file, if one was uploaded alongside.
    #[serde(default)]
    pub thumbnail_id: Option<Uuid>,
}

impl NewFile {
    /// Build the row to insert.
    pub fn into_file(self) -> File {
        let now = crate::timestamp_now();
        let original_name = self.original_name.unwrap_or_else(|| self.name.clone());
        File {
            id: self.id,
            name: self.name,
            folder_id: self.folder_id,
            category: self.category,
            status: FileStatus::Active,
            status_before_trash: None,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            owner: self.owner,
            is_pinned: false,
            original_name,
            thumbnail_id: self.thumbnail_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A file together with the tags linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWithTags {
    #[serde(flatten)]
    pub file: File,
    pub tags: Vec<TagSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_file() -> NewFile {
        NewFile {
            id: Uuid::now_v7(),
            name: "clip.mp4".to_string(),
            folder_id: None,
            category: Category::Media,
            mime_type: "video/mp4".to_string(),
            size_bytes: 42,
            owner: Owner::Wise,
            original_name: None,
            thumbnail_id: None,
        }
    }

    #[test]
    fn test_into_file_defaults() {
        let file = new_file().into_file();
        assert_eq!(file.status, FileStatus::Active);
        assert_eq!(file.original_name, "clip.mp4");
        assert!(!file.is_pinned);
        assert_eq!(file.created_at, file.updated_at);
    }

    #[test]
    fn test_blob_keys_include_thumbnail() {
        let thumb = Uuid::now_v7();
        let file = NewFile {
            thumbnail_id: Some(thumb),
            ..new_file()
        }
        .into_file();
        let keys: Vec<Uuid> = file.blob_keys().collect();
        assert_eq!(keys, vec![file.id, thumb]);
    }

    #[test]
    fn test_serialized_shape() {
        let file = new_file().into_file();
        let json = serde_json::to_value(FileWithTags {
            file,
            tags: Vec::new(),
        })
        .unwrap();
        assert_eq!(json["category"], "MEDIA");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["owner"], "Wise");
        assert!(json.get("folderId").is_some());
        assert!(json.get("statusBeforeTrash").is_none());
        assert!(json["tags"].as_array().unwrap().is_empty());
    }
}
