//! Catalog queries.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use vault_core::config::catalog::CatalogConfig;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::types::{Cursor, Page};
use vault_database::{CatalogStore, FileQuery, FolderScope, TagFilter, View};
use vault_entity::{File, FileWithTags, Folder, Owner, TagStatus, TagWithUsage};

/// Which tags a tag listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagListFilter {
    #[default]
    Active,
    Deleted,
    All,
}

impl TagListFilter {
    fn status(self) -> Option<TagStatus> {
        match self {
            Self::Active => Some(TagStatus::Active),
            Self::Deleted => Some(TagStatus::Deleted),
            Self::All => None,
        }
    }
}

impl FromStr for TagListFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "DELETED" => Ok(Self::Deleted),
            "ALL" => Ok(Self::All),
            _ => Err(AppError::validation(format!(
                "Invalid tag status: '{s}'. Expected one of: ACTIVE, DELETED, ALL"
            ))),
        }
    }
}

/// Contents of one directory level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entries {
    pub folders: Vec<Folder>,
    pub files: Vec<FileWithTags>,
}

/// Parameters of a cursor-paginated file listing.
#[derive(Debug, Clone, Default)]
pub struct PagedFilesQuery {
    pub owner: Option<Owner>,
    pub view: View,
    pub tag: Option<TagFilter>,
    /// `Any` lists across folders.
    pub scope: FolderScope,
    /// Opaque token from a previous page.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// Listing and lookup operations over the catalog store.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    config: CatalogConfig,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    /// Folders and files directly inside `parent_id` (the root when `None`).
    ///
    /// Only non-trashed user files are listed. With a tag filter no folders
    /// are returned, since folders cannot carry tags. A folder that does not
    /// exist lists as empty.
    pub async fn list_entries(
        &self,
        owner: Option<Owner>,
        parent_id: Option<Uuid>,
        tag: Option<TagFilter>,
    ) -> AppResult<Entries> {
        if let Some(id) = parent_id {
            if self.store.find_folder(id).await?.is_none() {
                debug!(folder_id = %id, "Listing entries of a missing folder");
                return Ok(Entries::default());
            }
        }

        let scope = FolderScope::level(parent_id);
        let folders = match tag {
            Some(_) => Vec::new(),
            None => self.store.list_folders(owner, scope).await?,
        };
        let query = FileQuery::new(View::Active).owner(owner).scope(scope).tag(tag);
        let files = self.store.list_files(&query).await?;

        Ok(Entries {
            folders,
            files: self.with_tags(files).await?,
        })
    }

    /// Every file in the view regardless of folder, newest first.
    pub async fn list_files_flat(
        &self,
        owner: Option<Owner>,
        view: View,
        tag: Option<TagFilter>,
    ) -> AppResult<Vec<FileWithTags>> {
        let query = FileQuery::new(view).owner(owner).tag(tag);
        let files = self.store.list_files(&query).await?;
        self.with_tags(files).await
    }

    /// One page of files after the cursor.
    ///
    /// Fetches one row past the limit to learn whether another page exists.
    pub async fn list_files_paged(&self, query: PagedFilesQuery) -> AppResult<Page<FileWithTags>> {
        let limit = self.config.page_size(query.limit);
        let after = query.cursor.as_deref().map(Cursor::decode).transpose()?;
        let file_query = FileQuery::new(query.view)
            .owner(query.owner)
            .scope(query.scope)
            .tag(query.tag)
            .after(after)
            .limit(Some(limit + 1));

        let rows = self.store.list_files(&file_query).await?;
        let page = Page::from_overfetch(rows, limit as usize, File::cursor);
        let tagged = self.with_tags(page.items).await?;
        Ok(Page {
            items: tagged,
            next_cursor: page.next_cursor,
        })
    }

    /// A file with its tags.
    pub async fn get_file(&self, id: Uuid) -> AppResult<FileWithTags> {
        let file = self
            .store
            .find_file(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File '{id}' not found")))?;
        let mut tagged = self.with_tags(vec![file]).await?;
        tagged
            .pop()
            .ok_or_else(|| AppError::internal("Tag resolution dropped a file"))
    }

    pub async fn get_folder(&self, id: Uuid) -> AppResult<Folder> {
        self.store
            .find_folder(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder '{id}' not found")))
    }

    /// Every folder, ordered by name.
    pub async fn all_folders(&self, owner: Option<Owner>) -> AppResult<Vec<Folder>> {
        self.store.all_folders(owner).await
    }

    /// Tags with their usage counts, ordered by name.
    pub async fn list_tags(&self, filter: TagListFilter) -> AppResult<Vec<TagWithUsage>> {
        self.store.list_tags(filter.status()).await
    }

    /// Ids of the files a query matches, in listing order.
    pub(crate) async fn list_ids(&self, query: &FileQuery) -> AppResult<Vec<Uuid>> {
        let files = self.store.list_files(query).await?;
        Ok(files.into_iter().map(|f| f.id).collect())
    }

    /// Attach active tag summaries to each file, keeping the input order.
    async fn with_tags(&self, files: Vec<File>) -> AppResult<Vec<FileWithTags>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = files.iter().map(|f| f.id).collect();
        let mut tags = self.store.tags_for_files(&ids).await?;
        Ok(files
            .into_iter()
            .map(|file| FileWithTags {
                tags: tags.remove(&file.id).unwrap_or_default(),
                file,
            })
            .collect())
    }
}
