//! Filters shared by every file listing.
//!
//! A [`FileQuery`] always hides preview rows (`SYSTEM` category). That rule
//! lives here rather than at each call site so no listing can forget it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use vault_core::AppError;
use vault_core::types::Cursor;
use vault_entity::{Category, File, Owner};

/// Which folders a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderScope {
    /// Every folder; the flat cross-folder listing.
    #[default]
    Any,
    /// Only files at the root.
    Root,
    /// Only the direct children of one folder.
    Folder(Uuid),
}

impl FolderScope {
    /// Scope for a nullable parent id: `None` means the root.
    pub fn level(parent_id: Option<Uuid>) -> Self {
        match parent_id {
            Some(id) => Self::Folder(id),
            None => Self::Root,
        }
    }

    /// Whether a file placed in `folder_id` falls inside the scope.
    pub fn contains(&self, folder_id: Option<Uuid>) -> bool {
        match self {
            Self::Any => true,
            Self::Root => folder_id.is_none(),
            Self::Folder(id) => folder_id == Some(*id),
        }
    }
}

/// Base view: live files or the trash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Files whose status is anything but `DELETED`.
    #[default]
    Active,
    /// Files whose status is `DELETED`.
    Trash,
}

impl FromStr for View {
    type Err = AppError;

    /// `tag` is accepted as a synonym for `active`; the tag filter itself is
    /// carried separately and composes with either view.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" | "tag" => Ok(Self::Active),
            "trash" => Ok(Self::Trash),
            _ => Err(AppError::validation(format!(
                "Invalid view: '{s}'. Expected one of: active, trash, tag"
            ))),
        }
    }
}

/// Restriction on tag links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFilter {
    /// Files linked to this tag.
    Tag(Uuid),
    /// Files with no tag links at all.
    Untagged,
}

impl FromStr for TagFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("untagged") {
            return Ok(Self::Untagged);
        }
        Uuid::parse_str(s)
            .map(Self::Tag)
            .map_err(|_| AppError::validation(format!("Invalid tag filter: '{s}'")))
    }
}

/// A file listing request, ordered by `(created_at DESC, id DESC)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub owner: Option<Owner>,
    pub scope: FolderScope,
    pub view: View,
    pub tag: Option<TagFilter>,
    /// Only rows strictly after this cursor.
    pub after: Option<Cursor>,
    /// Maximum number of rows.
    pub limit: Option<u32>,
}

impl FileQuery {
    pub fn new(view: View) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    pub fn owner(mut self, owner: Option<Owner>) -> Self {
        self.owner = owner;
        self
    }

    pub fn scope(mut self, scope: FolderScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn tag(mut self, tag: Option<TagFilter>) -> Self {
        self.tag = tag;
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.after = cursor;
        self
    }

    pub fn limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Evaluate every predicate except the tag filter against one row.
    ///
    /// The tag filter needs the link table and is applied by the store.
    pub fn matches_row(&self, file: &File) -> bool {
        if file.category == Category::System {
            return false;
        }
        let view_ok = match self.view {
            View::Active => !file.is_trashed(),
            View::Trash => file.is_trashed(),
        };
        view_ok
            && self.owner.is_none_or(|owner| file.owner == owner)
            && self.scope.contains(file.folder_id)
            && self
                .after
                .is_none_or(|cursor| cursor.precedes(file.created_at, file.id))
    }
}
