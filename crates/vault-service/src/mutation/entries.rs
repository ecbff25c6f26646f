//! Folder creation, renames, moves, and file trash/restore/delete.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};
use uuid::Uuid;

use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_database::WriteOp;
use vault_entity::{EntryKind, EntryRef, File, Folder, Owner, timestamp_now};

use super::outcome::BatchOutcome;
use super::service::{MutationService, split_entries, validate_name};
use crate::context::RequestContext;
use crate::folder::FolderTree;

/// Soft-delete direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Trash,
    Restore,
}

impl Transition {
    fn op(self, id: Uuid, at: chrono::DateTime<chrono::Utc>) -> WriteOp {
        match self {
            Self::Trash => WriteOp::TrashFile { id, at },
            Self::Restore => WriteOp::RestoreFile { id, at },
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Trash => "trash",
            Self::Restore => "restore",
        }
    }
}

/// Ops moving a file and its preview through the same transition.
fn transition_ops(files: &[File], transition: Transition) -> Vec<WriteOp> {
    let at = timestamp_now();
    files
        .iter()
        .flat_map(|file| file.blob_keys())
        .map(|id| transition.op(id, at))
        .collect()
}

impl MutationService {
    /// Create a folder. Sibling names may repeat.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        owner: Option<Owner>,
        parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        let name = validate_name(name, "Folder")?;
        if let Some(parent) = parent_id {
            self.require_folder(parent).await?;
        }
        let folder = Folder::new(name, ctx.owner_or_self(owner), parent_id);
        self.store
            .execute_batch(vec![WriteOp::InsertFolder(folder.clone())])
            .await?;
        info!(
            folder_id = %folder.id,
            owner = %folder.owner,
            parent_id = ?folder.parent_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Rename a file or folder in place. Only files track `updated_at`.
    pub async fn rename_entry(&self, kind: EntryKind, id: Uuid, name: &str) -> AppResult<()> {
        let name = validate_name(name, "Entry")?;
        let op = match kind {
            EntryKind::File => {
                self.require_file(id).await?;
                WriteOp::RenameFile {
                    id,
                    name,
                    at: timestamp_now(),
                }
            }
            EntryKind::Folder => {
                self.require_folder(id).await?;
                WriteOp::RenameFolder { id, name }
            }
        };
        self.store.execute_batch(vec![op]).await?;
        info!(entry_id = %id, kind = %kind, "Entry renamed");
        Ok(())
    }

    /// Move a file and its preview to the trash in one write.
    pub async fn trash_file(&self, id: Uuid) -> AppResult<()> {
        self.transition_file(id, Transition::Trash).await
    }

    /// Return a trashed file and its preview to their prior status.
    pub async fn restore_file(&self, id: Uuid) -> AppResult<()> {
        self.transition_file(id, Transition::Restore).await
    }

    async fn transition_file(&self, id: Uuid, transition: Transition) -> AppResult<()> {
        let file = self.require_file(id).await?;
        self.store
            .execute_batch(transition_ops(std::slice::from_ref(&file), transition))
            .await?;
        info!(
            file_id = %id,
            thumbnail_id = ?file.thumbnail_id,
            action = transition.label(),
            "File status changed"
        );
        Ok(())
    }

    /// Remove a file, its preview, and both blobs for good.
    ///
    /// Safe to repeat: a file that is already gone only has its blob
    /// delete retried, and a missing blob counts as deleted.
    pub async fn permanent_delete_file(&self, id: Uuid) -> AppResult<()> {
        let Some(file) = self.store.find_file(id).await? else {
            self.objects.delete(&id.to_string()).await?;
            debug!(file_id = %id, "Permanent delete of a file with no row");
            return Ok(());
        };

        let keys: Vec<Uuid> = file.blob_keys().collect();
        for key in &keys {
            self.objects.delete(&key.to_string()).await?;
        }
        self.store
            .execute_batch(keys.iter().map(|key| WriteOp::DeleteFile(*key)).collect())
            .await?;
        info!(file_id = %id, thumbnail_id = ?file.thumbnail_id, "File permanently deleted");
        Ok(())
    }

    /// Move one file to a folder, or to the root with `None`.
    pub async fn move_file(&self, id: Uuid, folder_id: Option<Uuid>) -> AppResult<()> {
        self.require_file(id).await?;
        if let Some(target) = folder_id {
            self.require_folder(target).await?;
        }
        self.store
            .execute_batch(vec![WriteOp::MoveFile {
                id,
                folder_id,
                at: timestamp_now(),
            }])
            .await?;
        info!(file_id = %id, folder_id = ?folder_id, "File moved");
        Ok(())
    }

    /// Trash a mixed batch. Files are trashed together in one write; each
    /// folder is deleted with its whole subtree, since folders have no
    /// trash state.
    pub async fn trash_entries(&self, items: &[EntryRef]) -> AppResult<BatchOutcome> {
        let (files, folders) = split_entries(items);
        let mut outcome = BatchOutcome::new(files.len() + folders.len());
        self.transition_files(&files, Transition::Trash, &mut outcome).await;
        self.delete_folders(&folders, &mut outcome).await;
        let outcome = outcome.finish();
        info!(
            submitted = outcome.submitted,
            succeeded = outcome.succeeded.len(),
            "Batch trash finished"
        );
        Ok(outcome)
    }

    /// Restore a batch of files together. Folders are never trashed, so
    /// folder items are reported as failures.
    pub async fn restore_entries(&self, items: &[EntryRef]) -> AppResult<BatchOutcome> {
        let (files, folders) = split_entries(items);
        let mut outcome = BatchOutcome::new(files.len() + folders.len());
        self.transition_files(&files, Transition::Restore, &mut outcome).await;
        outcome.fail_all(
            folders,
            &AppError::validation("Folders are not kept in the trash"),
        );
        let outcome = outcome.finish();
        info!(
            submitted = outcome.submitted,
            succeeded = outcome.succeeded.len(),
            "Batch restore finished"
        );
        Ok(outcome)
    }

    /// Permanently delete a mixed batch.
    ///
    /// Blobs of every file are deleted concurrently; a file whose blob
    /// delete fails keeps its row and is reported. The remaining file rows
    /// go in one write. Folders cascade one by one.
    pub async fn permanent_delete_entries(&self, items: &[EntryRef]) -> AppResult<BatchOutcome> {
        let (file_ids, folders) = split_entries(items);
        let mut outcome = BatchOutcome::new(file_ids.len() + folders.len());

        if !file_ids.is_empty() {
            match self.store.find_files(&file_ids).await {
                Ok(found) => self.purge_files(&file_ids, found, &mut outcome).await,
                Err(e) => outcome.fail_all(file_ids.iter().copied(), &e),
            }
        }
        self.delete_folders(&folders, &mut outcome).await;

        let outcome = outcome.finish();
        info!(
            submitted = outcome.submitted,
            succeeded = outcome.succeeded.len(),
            "Batch permanent delete finished"
        );
        Ok(outcome)
    }

    async fn purge_files(&self, requested: &[Uuid], found: Vec<File>, outcome: &mut BatchOutcome) {
        let by_id: HashMap<Uuid, &File> = found.iter().map(|f| (f.id, f)).collect();
        // Requested ids without a row still get their blob delete retried.
        let keys: Vec<Uuid> = requested
            .iter()
            .flat_map(|id| match by_id.get(id) {
                Some(file) => file.blob_keys().collect::<Vec<_>>(),
                None => vec![*id],
            })
            .collect();
        let failed: HashMap<Uuid, AppError> = self.delete_blobs(&keys).await.into_iter().collect();

        let mut ops = Vec::new();
        let mut pending = Vec::new();
        for &id in requested {
            let Some(file) = by_id.get(&id) else {
                match failed.get(&id) {
                    Some(e) => outcome.fail(id, e),
                    None => outcome.succeed(id),
                }
                continue;
            };
            match file.blob_keys().find_map(|key| failed.get(&key)) {
                Some(e) => outcome.fail(id, e),
                None => {
                    ops.extend(file.blob_keys().map(WriteOp::DeleteFile));
                    pending.push(id);
                }
            }
        }
        if ops.is_empty() {
            return;
        }
        match self.store.execute_batch(ops).await {
            Ok(()) => pending.into_iter().for_each(|id| outcome.succeed(id)),
            Err(e) => outcome.fail_all(pending, &e),
        }
    }

    /// Move a mixed batch to a folder, or to the root with `None`.
    ///
    /// A folder cannot move into itself or anywhere below itself. Valid
    /// moves apply together in one write.
    pub async fn move_entries(&self, items: &[EntryRef], target: Option<Uuid>) -> AppResult<BatchOutcome> {
        if let Some(target) = target {
            self.require_folder(target).await?;
        }
        let (file_ids, folder_ids) = split_entries(items);
        let mut outcome = BatchOutcome::new(file_ids.len() + folder_ids.len());
        let at = timestamp_now();
        let mut ops = Vec::new();
        let mut pending = Vec::new();

        if !file_ids.is_empty() {
            let existing: HashSet<Uuid> = self.store.find_files(&file_ids).await?.iter().map(|f| f.id).collect();
            for id in file_ids {
                if existing.contains(&id) {
                    ops.push(WriteOp::MoveFile {
                        id,
                        folder_id: target,
                        at,
                    });
                    pending.push(id);
                } else {
                    outcome.fail(id, &AppError::not_found(format!("File '{id}' not found")));
                }
            }
        }

        if !folder_ids.is_empty() {
            let tree = FolderTree::new(&self.store.all_folders(None).await?);
            for id in folder_ids {
                match self.check_folder_move(&tree, id, target) {
                    Ok(()) => {
                        ops.push(WriteOp::MoveFolder { id, parent_id: target });
                        pending.push(id);
                    }
                    Err(e) => outcome.fail(id, &e),
                }
            }
        }

        if !ops.is_empty() {
            match self.store.execute_batch(ops).await {
                Ok(()) => pending.into_iter().for_each(|id| outcome.succeed(id)),
                Err(e) => outcome.fail_all(pending, &e),
            }
        }
        let outcome = outcome.finish();
        info!(
            target = ?target,
            submitted = outcome.submitted,
            succeeded = outcome.succeeded.len(),
            "Batch move finished"
        );
        Ok(outcome)
    }

    fn check_folder_move(&self, tree: &FolderTree, id: Uuid, target: Option<Uuid>) -> AppResult<()> {
        if !tree.contains(id) {
            return Err(AppError::not_found(format!("Folder '{id}' not found")));
        }
        let Some(target) = target else {
            return Ok(());
        };
        if tree.is_self_or_ancestor(id, target, self.config.max_folder_depth)? {
            return Err(AppError::validation(format!(
                "Folder '{id}' cannot be moved into itself or one of its sub-folders"
            )));
        }
        Ok(())
    }

    /// Trash or restore many files and their previews in one write.
    async fn transition_files(&self, ids: &[Uuid], transition: Transition, outcome: &mut BatchOutcome) {
        if ids.is_empty() {
            return;
        }
        let found = match self.store.find_files(ids).await {
            Ok(found) => found,
            Err(e) => {
                outcome.fail_all(ids.iter().copied(), &e);
                return;
            }
        };
        let present: HashSet<Uuid> = found.iter().map(|f| f.id).collect();
        for &id in ids.iter().filter(|id| !present.contains(id)) {
            outcome.fail(id, &AppError::not_found(format!("File '{id}' not found")));
        }
        if found.is_empty() {
            return;
        }
        let ids_found: Vec<Uuid> = ids.iter().copied().filter(|id| present.contains(id)).collect();
        match self.store.execute_batch(transition_ops(&found, transition)).await {
            Ok(()) => ids_found.into_iter().for_each(|id| outcome.succeed(id)),
            Err(e) => outcome.fail_all(ids_found, &e),
        }
    }

    pub(super) async fn require_file(&self, id: Uuid) -> AppResult<File> {
        self.store
            .find_file(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File '{id}' not found")))
    }

    pub(super) async fn require_folder(&self, id: Uuid) -> AppResult<Folder> {
        self.store
            .find_folder(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder '{id}' not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use vault_core::error::ErrorKind;
    use vault_core::traits::storage::ObjectStore;
    use vault_database::CatalogStore;
    use vault_entity::FileStatus;

    fn ctx() -> RequestContext {
        RequestContext::new(Owner::Belle)
    }

    #[tokio::test]
    async fn test_create_folder_defaults_owner_and_checks_parent() {
        let fx = Fixture::new().await;
        let mutations = fx.mutations();
        let folder = mutations.create_folder(&ctx(), " clips ", None, None).await.unwrap();
        assert_eq!(folder.owner, Owner::Belle);
        assert_eq!(folder.name, "clips");

        let twin = mutations
            .create_folder(&ctx(), "clips", Some(Owner::Wise), None)
            .await
            .unwrap();
        assert_ne!(twin.id, folder.id);

        let err = mutations
            .create_folder(&ctx(), "orphan", None, Some(Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rename_touches_updated_at_for_files_only() {
        let fx = Fixture::new().await;
        let folder = fx.folder("old", None).await;
        let file = fx.file("old.mp4", None).await;
        let mutations = fx.mutations();

        mutations.rename_entry(EntryKind::Folder, folder.id, "new").await.unwrap();
        mutations.rename_entry(EntryKind::File, file.id, "new.mp4").await.unwrap();

        assert_eq!(fx.store.find_folder(folder.id).await.unwrap().unwrap().name, "new");
        let renamed = fx.store.find_file(file.id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "new.mp4");
        assert!(renamed.updated_at >= file.updated_at);

        let err = mutations
            .rename_entry(EntryKind::File, Uuid::now_v7(), "x")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_trash_restore_moves_thumbnail_in_lock_step() {
        let fx = Fixture::new().await;
        let (file, thumb) = fx.file_with_thumbnail("a.mp4", None).await;
        let mutations = fx.mutations();

        mutations.trash_file(file.id).await.unwrap();
        let trashed = fx.store.find_files(&[file.id, thumb.id]).await.unwrap();
        assert!(trashed.iter().all(|f| f.status == FileStatus::Deleted));

        mutations.restore_file(file.id).await.unwrap();
        let restored = fx.store.find_file(file.id).await.unwrap().unwrap();
        assert_eq!(restored.status, FileStatus::Archived);
        let restored_thumb = fx.store.find_file(thumb.id).await.unwrap().unwrap();
        assert_eq!(restored_thumb.status, FileStatus::Active);
    }

    #[tokio::test]
    async fn test_permanent_delete_cascades_to_thumbnail_and_is_repeatable() {
        let fx = Fixture::new().await;
        let (file, thumb) = fx.file_with_thumbnail("a.mp4", None).await;
        let mutations = fx.mutations();

        mutations.permanent_delete_file(file.id).await.unwrap();
        assert!(fx.store.find_file(file.id).await.unwrap().is_none());
        assert!(fx.store.find_file(thumb.id).await.unwrap().is_none());
        assert!(!fx.blob_exists(file.id).await);
        assert!(!fx.blob_exists(thumb.id).await);

        mutations.permanent_delete_file(file.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_permanent_delete_tolerates_missing_blob() {
        let fx = Fixture::new().await;
        let file = fx.file("a.mp4", None).await;
        fx.objects.delete(&file.id.to_string()).await.unwrap();
        fx.mutations().permanent_delete_file(file.id).await.unwrap();
        assert!(fx.store.find_file(file.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_trash_entries_mixes_files_and_folders() {
        let fx = Fixture::new().await;
        let (file, thumb) = fx.file_with_thumbnail("a.mp4", None).await;
        let folder = fx.folder("box", None).await;
        let inner = fx.file("inner.log", Some(folder.id)).await;
        let missing = Uuid::now_v7();

        let outcome = fx
            .mutations()
            .trash_entries(&[
                EntryRef::file(file.id),
                EntryRef::folder(folder.id),
                EntryRef::file(missing),
            ])
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.submitted, 3);
        assert_eq!(outcome.succeeded.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id, missing);
        assert_eq!(outcome.failed[0].error, ErrorKind::NotFound.to_string());

        let thumb_row = fx.store.find_file(thumb.id).await.unwrap().unwrap();
        assert!(thumb_row.is_trashed());
        assert!(fx.store.find_folder(folder.id).await.unwrap().is_none());
        assert!(fx.store.find_file(inner.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_entries_rejects_folders() {
        let fx = Fixture::new().await;
        let file = fx.file("a.mp4", None).await;
        let folder = fx.folder("box", None).await;
        let mutations = fx.mutations();
        mutations.trash_file(file.id).await.unwrap();

        let outcome = mutations
            .restore_entries(&[EntryRef::file(file.id), EntryRef::folder(folder.id)])
            .await
            .unwrap();
        assert_eq!(outcome.succeeded, vec![file.id]);
        assert_eq!(outcome.failed[0].id, folder.id);
        let row = fx.store.find_file(file.id).await.unwrap().unwrap();
        assert_eq!(row.status, FileStatus::Active);
    }

    #[tokio::test]
    async fn test_permanent_delete_entries_skips_file_whose_blob_delete_fails() {
        let fx = Fixture::new().await;
        let keep = fx.file("keep.mp4", None).await;
        let drop = fx.file("drop.mp4", None).await;
        fx.objects.fail_delete(keep.id);

        let outcome = fx
            .mutations()
            .permanent_delete_entries(&[EntryRef::file(keep.id), EntryRef::file(drop.id)])
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.succeeded, vec![drop.id]);
        assert_eq!(outcome.failed[0].id, keep.id);
        assert_eq!(outcome.failed[0].error, "STORE_UNAVAILABLE");

        assert!(fx.store.find_file(keep.id).await.unwrap().is_some());
        assert!(fx.store.find_file(drop.id).await.unwrap().is_none());
        assert!(!fx.blob_exists(drop.id).await);
    }

    #[tokio::test]
    async fn test_move_entries_rejects_cycles() {
        let fx = Fixture::new().await;
        let top = fx.folder("top", None).await;
        let mid = fx.folder("mid", Some(top.id)).await;
        let leaf = fx.folder("leaf", Some(mid.id)).await;
        let sibling = fx.folder("sibling", None).await;
        let file = fx.file("a.mp4", None).await;
        let mutations = fx.mutations();

        let outcome = mutations
            .move_entries(
                &[
                    EntryRef::folder(top.id),
                    EntryRef::folder(leaf.id),
                    EntryRef::folder(sibling.id),
                    EntryRef::file(file.id),
                ],
                Some(leaf.id),
            )
            .await
            .unwrap();

        let failed: Vec<Uuid> = outcome.failed.iter().map(|f| f.id).collect();
        assert_eq!(failed.len(), 2);
        assert!(failed.contains(&top.id));
        assert!(failed.contains(&leaf.id));
        assert!(outcome.failed.iter().all(|f| f.error == "VALIDATION"));
        assert_eq!(outcome.succeeded.len(), 2);

        let moved = fx.store.find_folder(sibling.id).await.unwrap().unwrap();
        assert_eq!(moved.parent_id, Some(leaf.id));
        let moved_file = fx.store.find_file(file.id).await.unwrap().unwrap();
        assert_eq!(moved_file.folder_id, Some(leaf.id));
        let untouched = fx.store.find_folder(top.id).await.unwrap().unwrap();
        assert_eq!(untouched.parent_id, None);
    }

    #[tokio::test]
    async fn test_move_to_missing_target_fails_whole_call() {
        let fx = Fixture::new().await;
        let file = fx.file("a.mp4", None).await;
        let mutations = fx.mutations();
        let err = mutations
            .move_entries(&[EntryRef::file(file.id)], Some(Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let folder = fx.folder("dest", None).await;
        mutations.move_file(file.id, Some(folder.id)).await.unwrap();
        mutations.move_file(file.id, None).await.unwrap();
        let row = fx.store.find_file(file.id).await.unwrap().unwrap();
        assert_eq!(row.folder_id, None);
    }
}
