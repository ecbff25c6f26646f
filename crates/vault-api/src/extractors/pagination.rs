//! Listing query parameters.
//!
//! Values arrive as strings and are parsed here so a bad value is reported
//! as a validation error naming the parameter, not a generic rejection.

use serde::{Deserialize, Serialize};

use vault_core::error::AppError;
use vault_database::{FolderScope, TagFilter, View};
use vault_entity::Owner;
use vault_service::PagedFilesQuery;

use super::path::parse_parent;

/// Filters shared by every file listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    /// `active`, `trash`, or `tag`.
    pub view: Option<String>,
    /// A tag id or `untagged`.
    pub tag_id: Option<String>,
    pub owner: Option<String>,
    /// `root` or a folder id.
    pub parent_id: Option<String>,
}

impl ListingParams {
    pub fn owner(&self) -> Result<Option<Owner>, AppError> {
        self.owner.as_deref().filter(|s| !s.is_empty()).map(str::parse).transpose()
    }

    pub fn view(&self) -> Result<View, AppError> {
        self.view
            .as_deref()
            .filter(|s| !s.is_empty())
            .map_or(Ok(View::Active), str::parse)
    }

    pub fn tag(&self) -> Result<Option<TagFilter>, AppError> {
        self.tag_id.as_deref().filter(|s| !s.is_empty()).map(str::parse).transpose()
    }

    /// Folder scope; an absent `parentId` means `absent`.
    pub fn scope_or(&self, absent: FolderScope) -> Result<FolderScope, AppError> {
        self.parent_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .map_or(Ok(absent), parse_parent)
    }
}

/// Query of the cursor-paginated file listing.
///
/// The filter fields are repeated rather than flattened, since flattening
/// defeats typed parsing of `limit` in query strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedParams {
    pub view: Option<String>,
    pub tag_id: Option<String>,
    pub owner: Option<String>,
    pub parent_id: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

impl PagedParams {
    /// Without `parentId` the listing spans every folder.
    pub fn into_query(self) -> Result<PagedFilesQuery, AppError> {
        let filters = ListingParams {
            view: self.view,
            tag_id: self.tag_id,
            owner: self.owner,
            parent_id: self.parent_id,
        };
        Ok(PagedFilesQuery {
            owner: filters.owner()?,
            view: filters.view()?,
            tag: filters.tag()?,
            scope: filters.scope_or(FolderScope::Any)?,
            cursor: self.cursor.filter(|c| !c.is_empty()),
            limit: self.limit,
        })
    }
}
