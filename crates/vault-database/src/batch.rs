//! Write operations submitted to the catalog as one atomic unit.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use vault_entity::{File, Folder, Tag, TagStatus};

/// One write statement of a batch.
///
/// A batch either applies completely or not at all. Ops apply in order, so
/// a batch that deletes a folder tree lists files before folders and child
/// folders before their parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    InsertFolder(Folder),
    InsertFile(File),
    InsertTag(Tag),
    /// Link a tag to a file. An existing link is left untouched.
    LinkTag { file_id: Uuid, tag_id: Uuid },
    /// Remove a link. A missing link is not an error.
    UnlinkTag { file_id: Uuid, tag_id: Uuid },
    /// Move a file into the trash, remembering its current status.
    /// Already-trashed files are left as they are.
    TrashFile { id: Uuid, at: DateTime<Utc> },
    /// Return a trashed file to the status it had before. Files that are not
    /// trashed are left as they are.
    RestoreFile { id: Uuid, at: DateTime<Utc> },
    RenameFile { id: Uuid, name: String, at: DateTime<Utc> },
    RenameFolder { id: Uuid, name: String },
    MoveFile {
        id: Uuid,
        folder_id: Option<Uuid>,
        at: DateTime<Utc>,
    },
    MoveFolder { id: Uuid, parent_id: Option<Uuid> },
    UpdateTag {
        id: Uuid,
        name: Option<String>,
        color: Option<String>,
        at: DateTime<Utc>,
    },
    SetTagStatus {
        id: Uuid,
        status: TagStatus,
        at: DateTime<Utc>,
    },
    /// Delete a tag and every link to it.
    DeleteTag(Uuid),
    /// Delete a file row and its links.
    DeleteFile(Uuid),
    DeleteFolder(Uuid),
}

impl WriteOp {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InsertFolder(_) => "insert_folder",
            Self::InsertFile(_) => "insert_file",
            Self::InsertTag(_) => "insert_tag",
            Self::LinkTag { .. } => "link_tag",
            Self::UnlinkTag { .. } => "unlink_tag",
            Self::TrashFile { .. } => "trash_file",
            Self::RestoreFile { .. } => "restore_file",
            Self::RenameFile { .. } => "rename_file",
            Self::RenameFolder { .. } => "rename_folder",
            Self::MoveFile { .. } => "move_file",
            Self::MoveFolder { .. } => "move_folder",
            Self::UpdateTag { .. } => "update_tag",
            Self::SetTagStatus { .. } => "set_tag_status",
            Self::DeleteTag(_) => "delete_tag",
            Self::DeleteFile(_) => "delete_file",
            Self::DeleteFolder(_) => "delete_folder",
        }
    }
}
