//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use vault_entity::{EntryKind, EntryRef, Owner};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Owner name to sign in as.
    #[validate(length(min = 1, message = "Identity is required"))]
    pub identity: String,
    /// Master key for that identity.
    #[validate(length(min = 1, message = "Master key is required"))]
    pub master_key: String,
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Defaults to the signed-in identity.
    #[serde(default)]
    pub owner: Option<Owner>,
}

/// Rename a file or folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Items of a batch trash, restore, or delete.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EntriesRequest {
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<EntryRef>,
}

/// Items of a batch move and where to put them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntriesRequest {
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<EntryRef>,
    /// `None` moves to the root.
    #[serde(default)]
    pub target_folder_id: Option<Uuid>,
}

/// Move one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFileRequest {
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// Attach a tag to a file by name.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddTagRequest {
    #[validate(length(min = 1, max = 255))]
    pub tag_name: String,
}

/// Create tag request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Update tag request; absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTagRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Ask for a presigned upload URL.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// Register many presigned uploads at once.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterBatchRequest {
    #[validate(length(min = 1, message = "At least one record is required"))]
    pub files: Vec<vault_service::PendingUpload>,
}
