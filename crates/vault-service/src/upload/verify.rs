//! Size verification of stored blobs.

use futures::future::join_all;
use tracing::warn;

use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_core::traits::storage::ObjectStore;

/// Check that the blob under `key` exists and holds exactly `declared` bytes.
pub async fn verify_size(objects: &dyn ObjectStore, key: &str, declared: u64) -> AppResult<()> {
    match objects.head(key).await? {
        Some(head) if head.size == declared => Ok(()),
        other => Err(AppError::integrity_mismatch(
            key,
            declared,
            other.map(|head| head.size),
        )),
    }
}

/// Verify many blobs, running at most `chunk_size` `head` calls at a time.
///
/// Results line up with `items`. One failure never stops the others.
pub async fn verify_in_chunks(
    objects: &dyn ObjectStore,
    items: &[(String, u64)],
    chunk_size: usize,
) -> Vec<AppResult<()>> {
    let mut results = Vec::with_capacity(items.len());
    for chunk in items.chunks(chunk_size.max(1)) {
        let checks = chunk
            .iter()
            .map(|(key, declared)| verify_size(objects, key, *declared));
        results.extend(join_all(checks).await);
    }
    results
}

/// Delete a blob that failed verification. Failure leaves an orphan.
pub async fn roll_back(objects: &dyn ObjectStore, key: &str, cause: &AppError) {
    if cause.kind != ErrorKind::IntegrityMismatch {
        return;
    }
    if let Err(e) = objects.delete(key).await {
        warn!(blob_key = key, error = %e, "Rollback of unverified blob failed");
    }
}
