//! Previous/next navigation between sibling files.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vault_core::result::AppResult;
use vault_database::{FileQuery, FolderScope, TagFilter, View};

use super::service::CatalogService;

/// Neighbours of a file in its listing, `None` at either end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiblingNav {
    pub prev_id: Option<Uuid>,
    pub next_id: Option<Uuid>,
}

impl SiblingNav {
    /// Neighbours of `target` within an ordered list of ids.
    pub fn locate(ordered: &[Uuid], target: Uuid) -> Self {
        match ordered.iter().position(|id| *id == target) {
            Some(index) => Self {
                prev_id: index.checked_sub(1).map(|i| ordered[i]),
                next_id: ordered.get(index + 1).copied(),
            },
            None => Self::default(),
        }
    }
}

impl CatalogService {
    /// The files just before and after `file_id` in its folder, under the
    /// same view and tag filter the flat listing uses.
    ///
    /// The ordered sibling set is rebuilt on every call so the answer always
    /// matches what a listing shows. An unknown file has no neighbours.
    pub async fn sibling_nav(
        &self,
        file_id: Uuid,
        view: View,
        tag: Option<TagFilter>,
    ) -> AppResult<SiblingNav> {
        let file = match self.get_file(file_id).await {
            Ok(found) => found.file,
            Err(e) if e.is_not_found() => return Ok(SiblingNav::default()),
            Err(e) => return Err(e),
        };
        let query = FileQuery::new(view)
            .scope(FolderScope::level(file.folder_id))
            .tag(tag);
        let ids = self.list_ids(&query).await?;
        Ok(SiblingNav::locate(&ids, file_id))
    }
}
