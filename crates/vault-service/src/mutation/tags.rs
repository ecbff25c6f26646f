//! Tag lifecycle and file-tag links.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_database::WriteOp;
use vault_entity::{Tag, TagStatus, TagSummary, timestamp_now};

use super::service::{MutationService, validate_name};

/// What `delete_tag` does to the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagDeleteMode {
    /// Hide the tag; its links stay.
    #[default]
    Trash,
    Restore,
    /// Remove the tag and every link to it.
    Permanent,
}

impl FromStr for TagDeleteMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trash" => Ok(Self::Trash),
            "restore" => Ok(Self::Restore),
            "permanent" => Ok(Self::Permanent),
            _ => Err(AppError::validation(format!(
                "Invalid mode: '{s}'. Expected one of: trash, restore, permanent"
            ))),
        }
    }
}

/// Accept `#rgb` and `#rrggbb` colors.
fn validate_color(color: &str) -> AppResult<String> {
    let color = color.trim();
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(AppError::validation(format!("Invalid tag color: '{color}'")));
    }
    Ok(color.to_string())
}

impl MutationService {
    /// Create a tag. Names are unique across the vault.
    pub async fn create_tag(&self, name: &str, color: Option<&str>) -> AppResult<Tag> {
        let name = validate_name(name, "Tag")?;
        let color = color.map(validate_color).transpose()?;
        let tag = Tag::new(name, color);
        self.store
            .execute_batch(vec![WriteOp::InsertTag(tag.clone())])
            .await?;
        info!(tag_id = %tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// Change a tag's name and/or color.
    pub async fn update_tag(&self, id: Uuid, name: Option<&str>, color: Option<&str>) -> AppResult<Tag> {
        let name = name.map(|n| validate_name(n, "Tag")).transpose()?;
        let color = color.map(validate_color).transpose()?;
        self.require_tag(id).await?;
        self.store
            .execute_batch(vec![WriteOp::UpdateTag {
                id,
                name,
                color,
                at: timestamp_now(),
            }])
            .await?;
        info!(tag_id = %id, "Tag updated");
        self.require_tag(id).await
    }

    /// Trash, restore, or permanently delete a tag.
    pub async fn delete_tag(&self, id: Uuid, mode: TagDeleteMode) -> AppResult<()> {
        self.require_tag(id).await?;
        let at = timestamp_now();
        let op = match mode {
            TagDeleteMode::Trash => WriteOp::SetTagStatus {
                id,
                status: TagStatus::Deleted,
                at,
            },
            TagDeleteMode::Restore => WriteOp::SetTagStatus {
                id,
                status: TagStatus::Active,
                at,
            },
            TagDeleteMode::Permanent => WriteOp::DeleteTag(id),
        };
        self.store.execute_batch(vec![op]).await?;
        info!(tag_id = %id, mode = ?mode, "Tag deleted");
        Ok(())
    }

    /// Link a tag to a file by name.
    ///
    /// The tag is created when no tag has that name and reactivated when it
    /// sits in the trash. Linking an already linked tag changes nothing.
    pub async fn add_tag_to_file(&self, file_id: Uuid, tag_name: &str) -> AppResult<TagSummary> {
        let name = validate_name(tag_name, "Tag")?;
        self.require_file(file_id).await?;

        // A concurrent request may create the same name between our read
        // and our write; the second pass then finds it.
        let mut attempt = 0;
        loop {
            attempt += 1;
            let existing = self.store.find_tags_by_names(std::slice::from_ref(&name)).await?;
            let (tag, mut ops) = match existing.into_iter().next() {
                Some(tag) if tag.is_active() => (tag, Vec::new()),
                Some(mut tag) => {
                    let at = timestamp_now();
                    let op = WriteOp::SetTagStatus {
                        id: tag.id,
                        status: TagStatus::Active,
                        at,
                    };
                    tag.status = TagStatus::Active;
                    (tag, vec![op])
                }
                None => {
                    let tag = Tag::new(name.clone(), None);
                    let op = WriteOp::InsertTag(tag.clone());
                    (tag, vec![op])
                }
            };
            ops.push(WriteOp::LinkTag {
                file_id,
                tag_id: tag.id,
            });

            match self.store.execute_batch(ops).await {
                Ok(()) => {
                    info!(file_id = %file_id, tag_id = %tag.id, tag = %tag.name, "Tag attached");
                    return Ok(tag.summary());
                }
                Err(e) if e.kind == ErrorKind::Conflict && attempt < 2 => {
                    debug!(tag = %name, error = %e, "Tag attach raced, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Unlink a tag from a file. A missing link is not an error.
    pub async fn remove_tag_from_file(&self, file_id: Uuid, tag_id: Uuid) -> AppResult<()> {
        self.store
            .execute_batch(vec![WriteOp::UnlinkTag { file_id, tag_id }])
            .await?;
        info!(file_id = %file_id, tag_id = %tag_id, "Tag detached");
        Ok(())
    }

    async fn require_tag(&self, id: Uuid) -> AppResult<Tag> {
        self.store
            .find_tag(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tag '{id}' not found")))
    }
}
