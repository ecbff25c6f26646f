//! Tag and file-tag link repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use vault_core::result::AppResult;
use vault_entity::{Tag, TagStatus, TagSummary, TagWithUsage};

use super::map_db_error;

/// Repository for tags and their links to files.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct LinkedTag {
    file_id: Uuid,
    #[sqlx(flatten)]
    tag: TagSummary,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error("Failed to find tag"))
    }

    pub async fn find_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error("Failed to find tags by name"))
    }

    /// Tags with link counts, ordered by name.
    pub async fn list_with_usage(&self, status: Option<TagStatus>) -> AppResult<Vec<TagWithUsage>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT t.*, (SELECT COUNT(*) FROM file_tags ft WHERE ft.tag_id = t.id) AS usage_count \
             FROM tags t",
        );
        if let Some(status) = status {
            qb.push(" WHERE t.status = ").push_bind(status);
        }
        qb.push(" ORDER BY t.name ASC");
        qb.build_query_as::<TagWithUsage>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error("Failed to list tags"))
    }

    /// Active tags linked to each file.
    pub async fn for_files(&self, file_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<TagSummary>>> {
        let rows = sqlx::query_as::<_, LinkedTag>(
            "SELECT ft.file_id, t.id, t.name, t.color FROM file_tags ft \
             JOIN tags t ON t.id = ft.tag_id \
             WHERE ft.file_id = ANY($1) AND t.status = 'ACTIVE' \
             ORDER BY t.name ASC",
        )
        .bind(file_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error("Failed to load file tags"))?;

        let mut out: HashMap<Uuid, Vec<TagSummary>> = HashMap::new();
        for row in rows {
            out.entry(row.file_id).or_default().push(row.tag);
        }
        Ok(out)
    }

    pub async fn insert(conn: &mut PgConnection, tag: &Tag) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO tags (id, name, color, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(tag.id)
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(tag.status)
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .execute(conn)
        .await
        .map_err(map_db_error("Failed to create tag"))?;
        Ok(())
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE tags SET name = COALESCE($2, name), color = COALESCE($3, color), updated_at = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(color)
        .bind(at)
        .execute(conn)
        .await
        .map_err(map_db_error("Failed to update tag"))?;
        Ok(())
    }

    pub async fn set_status(conn: &mut PgConnection, id: Uuid, status: TagStatus, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE tags SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(at)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to change tag status"))?;
        Ok(())
    }

    /// Delete a tag. Links go with it through `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to delete tag"))?;
        Ok(())
    }

    pub async fn link(conn: &mut PgConnection, file_id: Uuid, tag_id: Uuid) -> AppResult<()> {
        sqlx::query("INSERT INTO file_tags (file_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(file_id)
            .bind(tag_id)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to link tag"))?;
        Ok(())
    }

    pub async fn unlink(conn: &mut PgConnection, file_id: Uuid, tag_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM file_tags WHERE file_id = $1 AND tag_id = $2")
            .bind(file_id)
            .bind(tag_id)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to unlink tag"))?;
        Ok(())
    }
}
