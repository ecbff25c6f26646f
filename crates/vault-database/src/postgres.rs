//! PostgreSQL-backed catalog store.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use vault_core::result::AppResult;
use vault_entity::{File, Folder, Owner, Tag, TagStatus, TagSummary, TagWithUsage};

use crate::batch::WriteOp;
use crate::query::{FileQuery, FolderScope};
use crate::repositories::{map_db_error, FileRepository, FolderRepository, TagRepository};
use crate::store::{CatalogStore, StorageUsage};

/// Catalog store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    files: FileRepository,
    folders: FolderRepository,
    tags: TagRepository,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            files: FileRepository::new(pool.clone()),
            folders: FolderRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            pool,
        }
    }
}

async fn apply(conn: &mut PgConnection, op: WriteOp) -> AppResult<()> {
    match op {
        WriteOp::InsertFolder(folder) => FolderRepository::insert(conn, &folder).await,
        WriteOp::InsertFile(file) => FileRepository::insert(conn, &file).await,
        WriteOp::InsertTag(tag) => TagRepository::insert(conn, &tag).await,
        WriteOp::LinkTag { file_id, tag_id } => TagRepository::link(conn, file_id, tag_id).await,
        WriteOp::UnlinkTag { file_id, tag_id } => TagRepository::unlink(conn, file_id, tag_id).await,
        WriteOp::TrashFile { id, at } => FileRepository::trash(conn, id, at).await,
        WriteOp::RestoreFile { id, at } => FileRepository::restore(conn, id, at).await,
        WriteOp::RenameFile { id, name, at } => FileRepository::rename(conn, id, &name, at).await,
        WriteOp::RenameFolder { id, name } => FolderRepository::rename(conn, id, &name).await,
        WriteOp::MoveFile { id, folder_id, at } => FileRepository::set_folder(conn, id, folder_id, at).await,
        WriteOp::MoveFolder { id, parent_id } => FolderRepository::set_parent(conn, id, parent_id).await,
        WriteOp::UpdateTag { id, name, color, at } => {
            TagRepository::update(conn, id, name.as_deref(), color.as_deref(), at).await
        }
        WriteOp::SetTagStatus { id, status, at } => TagRepository::set_status(conn, id, status, at).await,
        WriteOp::DeleteTag(id) => TagRepository::delete(conn, id).await,
        WriteOp::DeleteFile(id) => FileRepository::delete(conn, id).await,
        WriteOp::DeleteFolder(id) => FolderRepository::delete(conn, id).await,
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(map_db_error("Health check failed"))
    }

    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>> {
        self.files.find_by_id(id).await
    }

    async fn find_files(&self, ids: &[Uuid]) -> AppResult<Vec<File>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.files.find_many(ids).await
    }

    async fn list_files(&self, query: &FileQuery) -> AppResult<Vec<File>> {
        self.files.list(query).await
    }

    async fn files_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        if folder_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.files.in_folders(folder_ids).await
    }

    async fn tags_for_files(&self, file_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<TagSummary>>> {
        if file_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.tags.for_files(file_ids).await
    }

    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>> {
        self.folders.find_by_id(id).await
    }

    async fn list_folders(&self, owner: Option<Owner>, scope: FolderScope) -> AppResult<Vec<Folder>> {
        self.folders.list(owner, scope).await
    }

    async fn all_folders(&self, owner: Option<Owner>) -> AppResult<Vec<Folder>> {
        self.folders.list(owner, FolderScope::Any).await
    }

    async fn find_tag(&self, id: Uuid) -> AppResult<Option<Tag>> {
        self.tags.find_by_id(id).await
    }

    async fn find_tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.tags.find_by_names(names).await
    }

    async fn list_tags(&self, status: Option<TagStatus>) -> AppResult<Vec<TagWithUsage>> {
        self.tags.list_with_usage(status).await
    }

    async fn storage_usage(&self) -> AppResult<StorageUsage> {
        self.files.usage().await
    }

    async fn execute_batch(&self, ops: Vec<WriteOp>) -> AppResult<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let count = ops.len();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(map_db_error("Failed to begin transaction"))?;
        for op in ops {
            let label = op.label();
            // Dropping `tx` on error rolls the transaction back.
            apply(&mut *tx, op)
                .await
                .inspect_err(|e| debug!(op = label, error = %e, "Batch rolled back"))?;
        }
        tx.commit()
            .await
            .map_err(map_db_error("Failed to commit transaction"))?;
        debug!(ops = count, "Batch committed");
        Ok(())
    }
}
