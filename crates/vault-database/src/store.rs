//! The catalog store contract.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vault_core::result::AppResult;
use vault_entity::{File, Folder, Owner, Tag, TagStatus, TagSummary, TagWithUsage};

use crate::batch::WriteOp;
use crate::query::{FileQuery, FolderScope};

/// Totals over every file row, trashed ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub used_bytes: i64,
    pub file_count: i64,
}

/// Persistence for folders, files, tags, and file-tag links.
///
/// Reads are individual queries; every write goes through
/// [`CatalogStore::execute_batch`] so multi-row transitions are atomic.
#[async_trait]
pub trait CatalogStore: Send + Sync + std::fmt::Debug + 'static {
    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>>;

    /// Files with the given ids, in no particular order. Unknown ids are skipped.
    async fn find_files(&self, ids: &[Uuid]) -> AppResult<Vec<File>>;

    /// Files matching the query, ordered by `(created_at DESC, id DESC)`.
    async fn list_files(&self, query: &FileQuery) -> AppResult<Vec<File>>;

    /// Every file row directly inside any of the given folders, whatever its
    /// status or category.
    async fn files_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>>;

    /// Active tags linked to each of the given files, ordered by name.
    async fn tags_for_files(&self, file_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<TagSummary>>>;

    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Folders directly inside a scope, ordered by name.
    async fn list_folders(&self, owner: Option<Owner>, scope: FolderScope) -> AppResult<Vec<Folder>>;

    /// Every folder, ordered by name.
    async fn all_folders(&self, owner: Option<Owner>) -> AppResult<Vec<Folder>>;

    async fn find_tag(&self, id: Uuid) -> AppResult<Option<Tag>>;

    async fn find_tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>>;

    /// Tags with their link counts, ordered by name. `None` lists every tag.
    async fn list_tags(&self, status: Option<TagStatus>) -> AppResult<Vec<TagWithUsage>>;

    async fn storage_usage(&self) -> AppResult<StorageUsage>;

    /// Apply every op or none of them.
    async fn execute_batch(&self, ops: Vec<WriteOp>) -> AppResult<()>;
}
