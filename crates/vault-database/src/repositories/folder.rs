//! Folder repository implementation.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use vault_core::result::AppResult;
use vault_entity::{Folder, Owner};

use super::map_db_error;
use crate::query::FolderScope;

/// Repository for folder rows.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a folder by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error("Failed to find folder"))
    }

    /// Folders in a scope, ordered by name.
    pub async fn list(&self, owner: Option<Owner>, scope: FolderScope) -> AppResult<Vec<Folder>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM folders WHERE TRUE");
        if let Some(owner) = owner {
            qb.push(" AND owner = ").push_bind(owner);
        }
        match scope {
            FolderScope::Any => {}
            FolderScope::Root => {
                qb.push(" AND parent_id IS NULL");
            }
            FolderScope::Folder(id) => {
                qb.push(" AND parent_id = ").push_bind(id);
            }
        }
        qb.push(" ORDER BY name ASC, id ASC");
        qb.build_query_as::<Folder>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error("Failed to list folders"))
    }

    pub async fn insert(conn: &mut PgConnection, folder: &Folder) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO folders (id, name, parent_id, owner, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .bind(folder.owner)
        .bind(folder.created_at)
        .execute(conn)
        .await
        .map_err(map_db_error("Failed to create folder"))?;
        Ok(())
    }

    pub async fn rename(conn: &mut PgConnection, id: Uuid, name: &str) -> AppResult<()> {
        sqlx::query("UPDATE folders SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to rename folder"))?;
        Ok(())
    }

    pub async fn set_parent(conn: &mut PgConnection, id: Uuid, parent_id: Option<Uuid>) -> AppResult<()> {
        sqlx::query("UPDATE folders SET parent_id = $2 WHERE id = $1")
            .bind(id)
            .bind(parent_id)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to move folder"))?;
        Ok(())
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(map_db_error("Failed to delete folder"))?;
        Ok(())
    }
}
