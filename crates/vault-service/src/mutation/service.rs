//! Mutation service wiring and shared helpers.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::warn;
use uuid::Uuid;

use vault_core::config::catalog::CatalogConfig;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::storage::ObjectStore;
use vault_database::CatalogStore;
use vault_entity::{EntryKind, EntryRef};

/// Blob deletes in flight at once during cascades.
const BLOB_DELETE_CONCURRENCY: usize = 16;

/// Longest accepted folder, file, or tag name.
const MAX_NAME_LEN: usize = 255;

/// Applies state transitions to the catalog and the blobs behind it.
#[derive(Debug, Clone)]
pub struct MutationService {
    pub(super) store: Arc<dyn CatalogStore>,
    pub(super) objects: Arc<dyn ObjectStore>,
    pub(super) config: CatalogConfig,
}

impl MutationService {
    /// Creates a new mutation service.
    pub fn new(store: Arc<dyn CatalogStore>, objects: Arc<dyn ObjectStore>, config: CatalogConfig) -> Self {
        Self {
            store,
            objects,
            config,
        }
    }

    /// Delete blobs concurrently, returning the keys whose delete failed.
    ///
    /// A missing blob counts as deleted.
    pub(super) async fn delete_blobs(&self, keys: &[Uuid]) -> Vec<(Uuid, AppError)> {
        stream::iter(keys.iter().copied())
            .map(|key| async move { (key, self.objects.delete(&key.to_string()).await) })
            .buffer_unordered(BLOB_DELETE_CONCURRENCY)
            .filter_map(|(key, result)| async move {
                match result {
                    Ok(()) => None,
                    Err(e) => {
                        warn!(blob_key = %key, error = %e, "Blob delete failed");
                        Some((key, e))
                    }
                }
            })
            .collect()
            .await
    }
}

/// Trim a name and check it is usable.
pub(crate) fn validate_name(name: &str, what: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{what} name cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{what} name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Split batch items by kind, dropping repeats.
pub(super) fn split_entries(items: &[EntryRef]) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut folders = Vec::new();
    for item in items {
        if !seen.insert(*item) {
            continue;
        }
        match item.kind {
            EntryKind::File => files.push(item.id),
            EntryKind::Folder => folders.push(item.id),
        }
    }
    (files, folders)
}
