//! In-process catalog store.
//!
//! Mirrors the PostgreSQL schema's constraints (unique tag names, foreign
//! keys, cascading link deletes) so behavior observed against it carries
//! over. Batches run against a copy of the state that replaces the live
//! state only when every op succeeded.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_entity::{File, FileStatus, Folder, Owner, Tag, TagStatus, TagSummary, TagWithUsage};

use crate::batch::WriteOp;
use crate::query::{FileQuery, FolderScope, TagFilter};
use crate::store::{CatalogStore, StorageUsage};

#[derive(Debug, Clone, Default)]
struct State {
    folders: HashMap<Uuid, Folder>,
    files: HashMap<Uuid, File>,
    tags: HashMap<Uuid, Tag>,
    /// `(file_id, tag_id)`
    links: BTreeSet<(Uuid, Uuid)>,
}

/// Catalog store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    state: Arc<RwLock<State>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of file-tag links, for assertions in tests.
    pub async fn link_count(&self) -> usize {
        self.state.read().await.links.len()
    }
}

fn fk_violation(what: &str, id: Uuid) -> AppError {
    AppError::conflict(format!("Referenced {what} '{id}' does not exist"))
}

impl State {
    fn has_tag_link(&self, file_id: Uuid) -> bool {
        self.links.range((file_id, Uuid::nil())..=(file_id, Uuid::max())).next().is_some()
    }

    fn matches_tag(&self, file_id: Uuid, filter: Option<TagFilter>) -> bool {
        match filter {
            None => true,
            Some(TagFilter::Tag(tag_id)) => self.links.contains(&(file_id, tag_id)),
            Some(TagFilter::Untagged) => !self.has_tag_link(file_id),
        }
    }

    fn apply(&mut self, op: WriteOp) -> AppResult<()> {
        match op {
            WriteOp::InsertFolder(folder) => {
                if let Some(parent) = folder.parent_id {
                    if !self.folders.contains_key(&parent) {
                        return Err(fk_violation("folder", parent));
                    }
                }
                if self.folders.contains_key(&folder.id) {
                    return Err(AppError::conflict(format!("Folder '{}' already exists", folder.id)));
                }
                self.folders.insert(folder.id, folder);
            }
            WriteOp::InsertFile(file) => {
                if let Some(folder_id) = file.folder_id {
                    if !self.folders.contains_key(&folder_id) {
                        return Err(fk_violation("folder", folder_id));
                    }
                }
                if let Some(thumb) = file.thumbnail_id {
                    if !self.files.contains_key(&thumb) {
                        return Err(fk_violation("thumbnail", thumb));
                    }
                }
                if self.files.contains_key(&file.id) {
                    return Err(AppError::conflict(format!("File '{}' already exists", file.id)));
                }
                self.files.insert(file.id, file);
            }
            WriteOp::InsertTag(tag) => {
                if self.tags.values().any(|t| t.name == tag.name) {
                    return Err(AppError::conflict(format!("Tag '{}' already exists", tag.name)));
                }
                self.tags.insert(tag.id, tag);
            }
            WriteOp::LinkTag { file_id, tag_id } => {
                if !self.files.contains_key(&file_id) {
                    return Err(fk_violation("file", file_id));
                }
                if !self.tags.contains_key(&tag_id) {
                    return Err(fk_violation("tag", tag_id));
                }
                self.links.insert((file_id, tag_id));
            }
            WriteOp::UnlinkTag { file_id, tag_id } => {
                self.links.remove(&(file_id, tag_id));
            }
            WriteOp::TrashFile { id, at } => {
                if let Some(file) = self.files.get_mut(&id) {
                    if !file.is_trashed() {
                        file.status_before_trash = Some(file.status);
                        file.status = FileStatus::Deleted;
                        file.updated_at = at;
                    }
                }
            }
            WriteOp::RestoreFile { id, at } => {
                if let Some(file) = self.files.get_mut(&id) {
                    if file.is_trashed() {
                        file.status = file.status_before_trash.take().unwrap_or_default();
                        file.updated_at = at;
                    }
                }
            }
            WriteOp::RenameFile { id, name, at } => {
                if let Some(file) = self.files.get_mut(&id) {
                    file.name = name;
                    file.updated_at = at;
                }
            }
            WriteOp::RenameFolder { id, name } => {
                if let Some(folder) = self.folders.get_mut(&id) {
                    folder.name = name;
                }
            }
            WriteOp::MoveFile { id, folder_id, at } => {
                if let Some(target) = folder_id {
                    if !self.folders.contains_key(&target) {
                        return Err(fk_violation("folder", target));
                    }
                }
                if let Some(file) = self.files.get_mut(&id) {
                    file.folder_id = folder_id;
                    file.updated_at = at;
                }
            }
            WriteOp::MoveFolder { id, parent_id } => {
                if let Some(target) = parent_id {
                    if !self.folders.contains_key(&target) {
                        return Err(fk_violation("folder", target));
                    }
                }
                if let Some(folder) = self.folders.get_mut(&id) {
                    folder.parent_id = parent_id;
                }
            }
            WriteOp::UpdateTag { id, name, color, at } => {
                if let Some(name) = &name {
                    if self.tags.values().any(|t| t.id != id && &t.name == name) {
                        return Err(AppError::conflict(format!("Tag '{name}' already exists")));
                    }
                }
                if let Some(tag) = self.tags.get_mut(&id) {
                    if let Some(name) = name {
                        tag.name = name;
                    }
                    if let Some(color) = color {
                        tag.color = color;
                    }
                    tag.updated_at = at;
                }
            }
            WriteOp::SetTagStatus { id, status, at } => {
                if let Some(tag) = self.tags.get_mut(&id) {
                    tag.status = status;
                    tag.updated_at = at;
                }
            }
            WriteOp::DeleteTag(id) => {
                self.tags.remove(&id);
                self.links.retain(|(_, tag_id)| *tag_id != id);
            }
            WriteOp::DeleteFile(id) => {
                if self.files.remove(&id).is_some() {
                    self.links.retain(|(file_id, _)| *file_id != id);
                    for file in self.files.values_mut() {
                        if file.thumbnail_id == Some(id) {
                            file.thumbnail_id = None;
                        }
                    }
                }
            }
            WriteOp::DeleteFolder(id) => {
                if self.folders.values().any(|f| f.parent_id == Some(id)) {
                    return Err(AppError::conflict(format!("Folder '{id}' still has sub-folders")));
                }
                if self.files.values().any(|f| f.folder_id == Some(id)) {
                    return Err(AppError::conflict(format!("Folder '{id}' still has files")));
                }
                self.folders.remove(&id);
            }
        }
        Ok(())
    }
}

fn sort_newest_first(files: &mut [File]) {
    files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

fn sort_by_name(folders: &mut [Folder]) {
    folders.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.state.read().await.files.get(&id).cloned())
    }

    async fn find_files(&self, ids: &[Uuid]) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.files.get(id).cloned()).collect())
    }

    async fn list_files(&self, query: &FileQuery) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        let mut files: Vec<File> = state
            .files
            .values()
            .filter(|f| query.matches_row(f) && state.matches_tag(f.id, query.tag))
            .cloned()
            .collect();
        sort_newest_first(&mut files);
        if let Some(limit) = query.limit {
            files.truncate(limit as usize);
        }
        Ok(files)
    }

    async fn files_in_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .values()
            .filter(|f| f.folder_id.is_some_and(|id| folder_ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn tags_for_files(&self, file_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<TagSummary>>> {
        let state = self.state.read().await;
        let mut out: HashMap<Uuid, Vec<TagSummary>> = HashMap::new();
        for (file_id, tag_id) in &state.links {
            if !file_ids.contains(file_id) {
                continue;
            }
            if let Some(tag) = state.tags.get(tag_id).filter(|t| t.is_active()) {
                out.entry(*file_id).or_default().push(tag.summary());
            }
        }
        for tags in out.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(out)
    }

    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn list_folders(&self, owner: Option<Owner>, scope: FolderScope) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| owner.is_none_or(|o| f.owner == o) && scope.contains(f.parent_id))
            .cloned()
            .collect();
        sort_by_name(&mut folders);
        Ok(folders)
    }

    async fn all_folders(&self, owner: Option<Owner>) -> AppResult<Vec<Folder>> {
        self.list_folders(owner, FolderScope::Any).await
    }

    async fn find_tag(&self, id: Uuid) -> AppResult<Option<Tag>> {
        Ok(self.state.read().await.tags.get(&id).cloned())
    }

    async fn find_tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        let state = self.state.read().await;
        Ok(state
            .tags
            .values()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn list_tags(&self, status: Option<TagStatus>) -> AppResult<Vec<TagWithUsage>> {
        let state = self.state.read().await;
        let mut tags: Vec<TagWithUsage> = state
            .tags
            .values()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .map(|t| TagWithUsage {
                tag: t.clone(),
                usage_count: state.links.iter().filter(|(_, tag_id)| *tag_id == t.id).count() as i64,
            })
            .collect();
        tags.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));
        Ok(tags)
    }

    async fn storage_usage(&self) -> AppResult<StorageUsage> {
        let state = self.state.read().await;
        Ok(StorageUsage {
            used_bytes: state.files.values().map(|f| f.size_bytes).sum(),
            file_count: state.files.len() as i64,
        })
    }

    async fn execute_batch(&self, ops: Vec<WriteOp>) -> AppResult<()> {
        let mut state = self.state.write().await;
        let mut draft = state.clone();
        let count = ops.len();
        for op in ops {
            let label = op.label();
            draft
                .apply(op)
                .inspect_err(|e| debug!(op = label, error = %e, "Batch rolled back"))?;
        }
        *state = draft;
        debug!(ops = count, "Batch committed");
        Ok(())
    }
}
