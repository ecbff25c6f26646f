//! Upload flows.
//!
//! Every flow ends the same way: a catalog row is written only after the
//! object store reports exactly the declared size for the blob. A blob that
//! fails the check is deleted and no row is ever written for it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use vault_core::config::catalog::CatalogConfig;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::storage::ObjectStore;
use vault_database::{CatalogStore, WriteOp};
use vault_entity::file::NewFile;
use vault_entity::{Category, File, Owner, Tag};

use super::verify::{roll_back, verify_in_chunks, verify_size};
use crate::context::RequestContext;
use crate::mutation::BatchOutcome;
use crate::mutation::service::validate_name;

const DEFAULT_MIME: &str = "application/octet-stream";

/// A file sent inline with the request.
#[derive(Debug, Clone)]
pub struct DirectUpload {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Bytes,
    /// Size the client says it sent; defaults to the received length.
    pub declared_size: Option<u64>,
    pub folder_id: Option<Uuid>,
    pub owner: Option<Owner>,
    pub category: Category,
    pub original_name: Option<String>,
    pub thumbnail_id: Option<Uuid>,
}

/// A presigned upload URL and the id the blob will be stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub id: Uuid,
    pub upload_url: String,
}

/// A blob already uploaded through a presigned URL, awaiting registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUpload {
    pub file_id: Uuid,
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
    pub file_size: u64,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub thumbnail_id: Option<Uuid>,
    /// Tag names to link; missing tags are created.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PendingUpload {
    fn into_new_file(self, owner: Owner) -> AppResult<NewFile> {
        Ok(NewFile {
            id: self.file_id,
            name: validate_name(&self.file_name, "File")?,
            folder_id: self.folder_id,
            category: self.category,
            mime_type: self.file_type.unwrap_or_else(|| DEFAULT_MIME.to_string()),
            size_bytes: size_column(self.file_size)?,
            owner: self.owner.unwrap_or(owner),
            original_name: self.original_name,
            thumbnail_id: self.thumbnail_id,
        })
    }
}

fn size_column(size: u64) -> AppResult<i64> {
    i64::try_from(size).map_err(|_| AppError::validation(format!("File size {size} is too large")))
}

fn already_registered(id: Uuid) -> AppError {
    AppError::conflict(format!("File '{id}' is already registered"))
}

/// Trimmed, non-empty tag names, first occurrence kept.
fn tag_names<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty() && seen.insert(n.to_string()))
        .map(str::to_string)
        .collect()
}

/// Verifies uploaded blobs and registers them in the catalog.
#[derive(Debug, Clone)]
pub struct UploadService {
    store: Arc<dyn CatalogStore>,
    objects: Arc<dyn ObjectStore>,
    config: CatalogConfig,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(store: Arc<dyn CatalogStore>, objects: Arc<dyn ObjectStore>, config: CatalogConfig) -> Self {
        Self {
            store,
            objects,
            config,
        }
    }

    /// Store the bytes, verify them, then register the file.
    pub async fn upload_direct(&self, ctx: &RequestContext, upload: DirectUpload) -> AppResult<File> {
        let name = validate_name(&upload.name, "File")?;
        let declared = upload.declared_size.unwrap_or(upload.data.len() as u64);
        self.check_targets(upload.folder_id, upload.thumbnail_id).await?;

        let mime_type = upload.mime_type.unwrap_or_else(|| DEFAULT_MIME.to_string());
        let new_file = NewFile {
            id: Uuid::now_v7(),
            name,
            folder_id: upload.folder_id,
            category: upload.category,
            mime_type: mime_type.clone(),
            size_bytes: size_column(declared)?,
            owner: ctx.owner_or_self(upload.owner),
            original_name: upload.original_name,
            thumbnail_id: upload.thumbnail_id,
        };
        let key = new_file.id.to_string();

        self.objects.put(&key, upload.data, &mime_type).await?;
        if let Err(e) = verify_size(self.objects.as_ref(), &key, declared).await {
            warn!(file_id = %new_file.id, error = %e, "Direct upload failed verification");
            roll_back(self.objects.as_ref(), &key, &e).await;
            return Err(e);
        }

        let file = new_file.into_file();
        if let Err(e) = self
            .store
            .execute_batch(vec![WriteOp::InsertFile(file.clone())])
            .await
        {
            // The id is fresh, so nothing else refers to this blob.
            if let Err(cleanup) = self.objects.delete(&key).await {
                warn!(file_id = %file.id, error = %cleanup, "Orphaned blob after failed insert");
            }
            return Err(e);
        }

        info!(
            file_id = %file.id,
            owner = %file.owner,
            size_bytes = file.size_bytes,
            "Direct upload registered"
        );
        Ok(file)
    }

    /// Issue a presigned `PUT` URL under a fresh id.
    pub async fn presign(&self, file_name: &str, content_type: &str) -> AppResult<PresignedUpload> {
        validate_name(file_name, "File")?;
        let content_type = match content_type.trim() {
            "" => DEFAULT_MIME,
            other => other,
        };
        let id = Uuid::now_v7();
        let upload_url = self.objects.presign_upload(&id.to_string(), content_type).await?;
        info!(file_id = %id, "Presigned upload issued");
        Ok(PresignedUpload { id, upload_url })
    }

    /// Verify one presigned upload and register it with its tags.
    ///
    /// An id that is already catalogued is rejected before its blob is
    /// checked and its blob is left alone.
    pub async fn register(&self, ctx: &RequestContext, pending: PendingUpload) -> AppResult<File> {
        if self.store.find_file(pending.file_id).await?.is_some() {
            return Err(already_registered(pending.file_id));
        }
        self.check_targets(pending.folder_id, pending.thumbnail_id).await?;
        let key = pending.file_id.to_string();
        if let Err(e) = verify_size(self.objects.as_ref(), &key, pending.file_size).await {
            warn!(file_id = %pending.file_id, error = %e, "Registration failed verification");
            roll_back(self.objects.as_ref(), &key, &e).await;
            return Err(e);
        }

        let names = tag_names(&pending.tags);
        let new_file = pending.into_new_file(ctx.owner)?;
        let (mut ops, tags) = self.resolve_tags(&names).await?;
        let file = new_file.into_file();
        ops.push(WriteOp::InsertFile(file.clone()));
        ops.extend(names.iter().filter_map(|name| tags.get(name)).map(|tag_id| WriteOp::LinkTag {
            file_id: file.id,
            tag_id: *tag_id,
        }));
        self.store.execute_batch(ops).await?;

        info!(file_id = %file.id, owner = %file.owner, tags = names.len(), "Upload registered");
        Ok(file)
    }

    /// Verify and register many presigned uploads in one catalog write.
    ///
    /// Blobs are checked `verify_chunk_size` at a time. Records that fail
    /// the check, repeat an id, reuse a catalogued id, or point at a missing
    /// folder or preview are left out and reported; the rest are registered together with any
    /// tags they name. A failure of that final write is returned as an
    /// error.
    pub async fn register_batch(&self, ctx: &RequestContext, records: Vec<PendingUpload>) -> AppResult<BatchOutcome> {
        let mut outcome = BatchOutcome::new(records.len());
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for record in records {
            if !seen.insert(record.file_id) {
                outcome.fail(
                    record.file_id,
                    &AppError::validation("File id appears more than once in the batch"),
                );
                continue;
            }
            candidates.push(record);
        }

        let ids: Vec<Uuid> = candidates.iter().map(|r| r.file_id).collect();
        let existing: HashSet<Uuid> = if ids.is_empty() {
            HashSet::new()
        } else {
            self.store.find_files(&ids).await?.into_iter().map(|f| f.id).collect()
        };
        candidates.retain(|record| {
            if existing.contains(&record.file_id) {
                outcome.fail(record.file_id, &already_registered(record.file_id));
                return false;
            }
            true
        });

        let checks: Vec<(String, u64)> = candidates
            .iter()
            .map(|r| (r.file_id.to_string(), r.file_size))
            .collect();
        let results = verify_in_chunks(self.objects.as_ref(), &checks, self.config.verify_chunk_size).await;

        let mut verified = Vec::new();
        for (record, result) in candidates.into_iter().zip(results) {
            match result {
                Ok(()) => verified.push(record),
                Err(e) => {
                    warn!(file_id = %record.file_id, error = %e, "Batch record failed verification");
                    roll_back(self.objects.as_ref(), &record.file_id.to_string(), &e).await;
                    outcome.fail(record.file_id, &e);
                }
            }
        }
        let valid = self.filter_targets(verified, &mut outcome).await?;
        if valid.is_empty() {
            return Ok(outcome.finish());
        }

        let names = tag_names(valid.iter().flat_map(|r| r.tags.iter()));
        let (mut ops, tags) = self.resolve_tags(&names).await?;
        let mut inserts = Vec::new();
        let mut links = Vec::new();
        let mut registered = Vec::new();
        for record in valid {
            let file_id = record.file_id;
            let record_tags = tag_names(&record.tags);
            let file = match record.into_new_file(ctx.owner) {
                Ok(new_file) => new_file.into_file(),
                Err(e) => {
                    outcome.fail(file_id, &e);
                    continue;
                }
            };
            links.extend(record_tags.iter().filter_map(|n| tags.get(n)).map(|tag_id| WriteOp::LinkTag {
                file_id,
                tag_id: *tag_id,
            }));
            inserts.push(file);
            registered.push(file_id);
        }
        // Previews first so rows referencing them in the same batch resolve.
        inserts.sort_by_key(|file| !file.is_preview());
        ops.extend(inserts.into_iter().map(WriteOp::InsertFile));
        ops.extend(links);

        if !registered.is_empty() {
            self.store.execute_batch(ops).await?;
        }
        registered.into_iter().for_each(|id| outcome.succeed(id));

        let outcome = outcome.finish();
        info!(
            submitted = outcome.submitted,
            registered = outcome.succeeded.len(),
            rejected = outcome.failed.len(),
            "Batch registration finished"
        );
        Ok(outcome)
    }

    /// Look up tags by name, preparing inserts for the missing ones.
    async fn resolve_tags(&self, names: &[String]) -> AppResult<(Vec<WriteOp>, HashMap<String, Uuid>)> {
        if names.is_empty() {
            return Ok((Vec::new(), HashMap::new()));
        }
        let mut ids: HashMap<String, Uuid> = self
            .store
            .find_tags_by_names(names)
            .await?
            .into_iter()
            .map(|tag| (tag.name, tag.id))
            .collect();
        let mut ops = Vec::new();
        for name in names {
            if !ids.contains_key(name) {
                let tag = Tag::new(name.clone(), None);
                ids.insert(name.clone(), tag.id);
                ops.push(WriteOp::InsertTag(tag));
            }
        }
        Ok((ops, ids))
    }

    async fn check_targets(&self, folder_id: Option<Uuid>, thumbnail_id: Option<Uuid>) -> AppResult<()> {
        if let Some(folder) = folder_id {
            if self.store.find_folder(folder).await?.is_none() {
                return Err(AppError::not_found(format!("Folder '{folder}' not found")));
            }
        }
        if let Some(thumb) = thumbnail_id {
            if self.store.find_file(thumb).await?.is_none() {
                return Err(AppError::not_found(format!("Thumbnail '{thumb}' not found")));
            }
        }
        Ok(())
    }

    /// Drop records whose folder or preview exists neither in the catalog
    /// nor among the other verified records.
    async fn filter_targets(
        &self,
        records: Vec<PendingUpload>,
        outcome: &mut BatchOutcome,
    ) -> AppResult<Vec<PendingUpload>> {
        let mut folders = HashMap::new();
        for folder in records.iter().filter_map(|r| r.folder_id) {
            if let std::collections::hash_map::Entry::Vacant(slot) = folders.entry(folder) {
                slot.insert(self.store.find_folder(folder).await?.is_some());
            }
        }
        let batch_ids: HashSet<Uuid> = records.iter().map(|r| r.file_id).collect();
        let thumbs: Vec<Uuid> = records
            .iter()
            .filter_map(|r| r.thumbnail_id)
            .filter(|id| !batch_ids.contains(id))
            .collect();
        let known: HashSet<Uuid> = if thumbs.is_empty() {
            HashSet::new()
        } else {
            self.store.find_files(&thumbs).await?.into_iter().map(|f| f.id).collect()
        };

        let mut kept = Vec::new();
        for record in records {
            if let Some(folder) = record.folder_id.filter(|id| !folders.get(id).copied().unwrap_or(false)) {
                outcome.fail(record.file_id, &AppError::not_found(format!("Folder '{folder}' not found")));
                continue;
            }
            if let Some(thumb) = record
                .thumbnail_id
                .filter(|id| !batch_ids.contains(id) && !known.contains(id))
            {
                outcome.fail(record.file_id, &AppError::not_found(format!("Thumbnail '{thumb}' not found")));
                continue;
            }
            kept.push(record);
        }
        Ok(kept)
    }
}
