//! Recursive folder deletion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use vault_core::result::AppResult;
use vault_database::WriteOp;

use super::outcome::BatchOutcome;
use super::service::MutationService;
use crate::folder::FolderTree;

/// What a folder cascade removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDeletion {
    pub folders_deleted: usize,
    pub files_deleted: usize,
    /// Blobs whose delete failed and are left orphaned.
    pub blobs_failed: usize,
}

impl MutationService {
    /// Delete a folder and everything below it.
    ///
    /// The whole subtree is collected first: every folder, every file row
    /// inside them whatever its status, and each file's preview. Blobs are
    /// then deleted concurrently; a failed blob delete is logged and left
    /// as an orphan. Finally all rows go in one write, files first and
    /// child folders before their parents, so the rows either all go or
    /// all stay. A folder that no longer exists is already deleted.
    pub async fn delete_folder(&self, id: Uuid) -> AppResult<FolderDeletion> {
        let tree = FolderTree::new(&self.store.all_folders(None).await?);
        let folder_ids = tree.subtree(id, self.config.max_folder_depth)?;
        if folder_ids.is_empty() {
            debug!(folder_id = %id, "Folder already gone");
            return Ok(FolderDeletion::default());
        }

        let files = self.store.files_in_folders(&folder_ids).await?;
        let mut seen = HashSet::new();
        let file_ids: Vec<Uuid> = files
            .iter()
            .flat_map(|file| file.blob_keys())
            .filter(|key| seen.insert(*key))
            .collect();

        let failed = self.delete_blobs(&file_ids).await;
        if !failed.is_empty() {
            warn!(
                folder_id = %id,
                failed = failed.len(),
                "Folder cascade left orphaned blobs"
            );
        }

        let ops: Vec<WriteOp> = file_ids
            .iter()
            .map(|key| WriteOp::DeleteFile(*key))
            .chain(folder_ids.iter().rev().map(|folder| WriteOp::DeleteFolder(*folder)))
            .collect();
        self.store.execute_batch(ops).await?;

        let summary = FolderDeletion {
            folders_deleted: folder_ids.len(),
            files_deleted: file_ids.len(),
            blobs_failed: failed.len(),
        };
        info!(
            folder_id = %id,
            folders = summary.folders_deleted,
            files = summary.files_deleted,
            "Folder deleted recursively"
        );
        Ok(summary)
    }

    /// Cascade each folder independently, recording one outcome per folder.
    pub(super) async fn delete_folders(&self, ids: &[Uuid], outcome: &mut BatchOutcome) {
        for &id in ids {
            match self.delete_folder(id).await {
                Ok(_) => outcome.succeed(id),
                Err(e) => outcome.fail(id, &e),
            }
        }
    }
}
