//! File repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use vault_core::result::AppResult;
use vault_entity::File;

use super::map_db_error;
use crate::query::{FileQuery, FolderScope, TagFilter, View};
use crate::store::StorageUsage;

/// Repository for file rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

/// Append the `WHERE` clause of a file listing.
///
/// Preview rows are excluded unconditionally.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &FileQuery) {
    qb.push(" WHERE f.category <> 'SYSTEM'");
    match query.view {
        View::Active => qb.push(" AND f.status <> 'DELETED'"),
        View::Trash => qb.push(" AND f.status = 'DELETED'"),
    };
    if let Some(owner) = query.owner {
        qb.push(" AND f.owner = ").push_bind(owner);
    }
    match query.scope {
        FolderScope::Any => {}
        FolderScope::Root => {
            qb.push(" AND f.folder_id IS NULL");
        }
        FolderScope::Folder(id) => {
            qb.push(" AND f.folder_id = ").push_bind(id);
        }
    }
    match query.tag {
        None => {}
        Some(TagFilter::Tag(tag_id)) => {
            qb.push(" AND EXISTS (SELECT 1 FROM file_tags ft WHERE ft.file_id = f.id AND ft.tag_id = ")
                .push_bind(tag_id)
                .push(")");
        }
        Some(TagFilter::Untagged) => {
            qb.push(" AND NOT EXISTS (SELECT 1 FROM file_tags ft WHERE ft.file_id = f.id)");
        }
    }
    if let Some(cursor) = query.after {
        qb.push(" AND (f.created_at < ")
            .push_bind(cursor.created_at)
            .push(" OR (f.created_at = ")
            .push_bind(cursor.created_at)
            .push(" AND f.id < ")
            .push_bind(cursor.id)
            .push("))");
    }
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error("Failed to find file"))
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error("Failed to load files"))
    }

    /// Files matching a listing query, newest first.
    pub async fn list(&self, query: &FileQuery) -> AppResult<Vec<File>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT f.* FROM files f");
        push_filters(&mut qb, query);
        qb.push(" ORDER BY f.created_at DESC, f.id DESC");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }
        qb.build_query_as::<File>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error("Failed to list files"))
    }

    /// Every row directly inside the given folders.
    pub async fn in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE folder_id = ANY($1)")
            .bind(folder_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error("Failed to list folder contents"))
    }

    pub async fn usage(&self) -> AppResult<StorageUsage> {
        let (used_bytes, file_count): (i64, i64) =
            sqlx::query_as("SELECT COALESCE(SUM(size_bytes), 0)::BIGINT, COUNT(*) FROM files")
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error("Failed to compute storage usage"))?;
        Ok(StorageUsage {
            used_bytes,
            file_count,
        })
    }

    pub async fn insert(conn: &mut PgConnection, file: &File) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO files (id, name, folder_id, category, status, status_before_trash, mime_type, \
             size_bytes, owner, is_pinned, original_name, thumbnail_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(file.id)
        .bind(&file.name)
        .bind(file.folder_id)
        .bind(file.category)
        .bind(file.status)
        .bind(file.status_before_trash)
        .bind(&file.mime_type)
        .bind(file.size_bytes)
        .bind(file.owner)
        .bind(file.is_pinned)
        .bind(&file.original_name)
        .bind(file.thumbnail_id)
        .bind(file.created_at)
        .bind(file.updated_at)
        .execute(conn)
        .await
        .map_err(map_db_error("Failed to register file"))?;
        Ok(())
    }

    pub async fn trash(conn: &mut PgConnection, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE files SET status_before_trash = status, status = 'DELETED', updated_at = $2 \
             WHERE id = $1 AND status <> 'DELETED'",
        )
        .bind(id)
        .bind(at)
        .execute(conn)
        .await
        .map_err(map_db_error("Failed to trash file"))?;
        Ok(())
    }

    pub async fn restore(conn: &mut PgConnection, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE files SET status = COALESCE(status_before_trash, 'ACTIVE'), \
             status_before_trash = NULL, updated_at = $2 \
             WHERE id = $1 AND status = 'DELETED'",
        )
        .bind(id)
        .bind(at)
        .execute(conn)
        .await
        .map_err(map_db_error("Failed to restore file"))?;
        Ok(())
    }

    pub async fn rename(conn: &mut PgConnection, id: Uuid, name: &str, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE files SET name = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(at)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to rename file"))?;
        Ok(())
    }

    pub async fn set_folder(
        conn: &mut PgConnection,
        id: Uuid,
        folder_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE files SET folder_id = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(folder_id)
            .bind(at)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to move file"))?;
        Ok(())
    }

    /// Delete a row. Links go with it through `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to delete file"))?;
        Ok(())
    }
}
