//! Media access service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::storage::{ObjectBody, ObjectStore};
use vault_core::types::range::ByteRange;
use vault_database::CatalogStore;
use vault_entity::File;

/// Storage totals for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub used_bytes: u64,
    pub capacity_bytes: u64,
    pub file_count: u64,
}

/// Serves file bytes from the object store.
#[derive(Debug, Clone)]
pub struct MediaService {
    store: Arc<dyn CatalogStore>,
    objects: Arc<dyn ObjectStore>,
    capacity_bytes: u64,
}

impl MediaService {
    /// Creates a new media service.
    pub fn new(store: Arc<dyn CatalogStore>, objects: Arc<dyn ObjectStore>, capacity_bytes: u64) -> Self {
        Self {
            store,
            objects,
            capacity_bytes,
        }
    }

    async fn require_file(&self, file_id: Uuid) -> AppResult<File> {
        self.store
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File '{file_id}' not found")))
    }

    /// Short-lived URL for inline playback.
    pub async fn media_url(&self, file_id: Uuid) -> AppResult<String> {
        let file = self.require_file(file_id).await?;
        self.objects.presign_download(&file.id.to_string(), None).await
    }

    /// Short-lived URL that downloads under the name the file was uploaded as.
    pub async fn download_url(&self, file_id: Uuid) -> AppResult<String> {
        let file = self.require_file(file_id).await?;
        self.objects
            .presign_download(&file.id.to_string(), Some(&file.original_name))
            .await
    }

    /// Stream a file's bytes, optionally a single range of them.
    pub async fn stream(&self, file_id: Uuid, range: Option<ByteRange>) -> AppResult<(File, ObjectBody)> {
        let file = self.require_file(file_id).await?;
        let body = self.objects.get(&file.id.to_string(), range).await?;
        debug!(
            file_id = %file.id,
            range = ?body.range,
            content_length = body.content_length,
            "Streaming file"
        );
        Ok((file, body))
    }

    /// Bytes used by all registered files against the configured capacity.
    pub async fn storage_stats(&self) -> AppResult<StorageStats> {
        let usage = self.store.storage_usage().await?;
        Ok(StorageStats {
            used_bytes: usage.used_bytes.max(0) as u64,
            capacity_bytes: self.capacity_bytes,
            file_count: usage.file_count.max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use futures::StreamExt;
    use vault_core::error::ErrorKind;
    use vault_entity::Category;

    async fn collect(body: ObjectBody) -> Vec<u8> {
        let mut out = Vec::new();
        let mut stream = body.body;
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_urls_point_at_blob() {
        let fx = Fixture::new().await;
        let file = fx.file("clip.mp4", None).await;
        let media = fx.media();
        assert_eq!(
            media.media_url(file.id).await.unwrap(),
            format!("http://blobs.test/{}", file.id)
        );
        assert!(media.download_url(file.id).await.unwrap().ends_with("?download=1"));
        let err = media.media_url(Uuid::now_v7()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_ranged_stream() {
        let fx = Fixture::new().await;
        let file = fx.file("clip.mp4", None).await;
        let (_, body) = fx
            .media()
            .stream(file.id, Some(ByteRange::Suffix { len: 4 }))
            .await
            .unwrap();
        assert_eq!(body.content_range().as_deref(), Some("bytes 12-15/16"));
        assert_eq!(collect(body).await.len(), 4);

        let err = fx
            .media()
            .stream(file.id, Some(ByteRange::From { start: 16 }))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RangeNotSatisfiable);
    }

    #[tokio::test]
    async fn test_storage_stats_count_previews() {
        let fx = Fixture::new().await;
        fx.file("a", None).await;
        fx.file_with_thumbnail("b", None).await;
        fx.file_with("c", None, Category::Log, 100).await;
        let stats = fx.media().storage_stats().await.unwrap();
        assert_eq!(stats.capacity_bytes, 1_000_000);
        assert_eq!(stats.used_bytes, 16 + 4 + 32 + 100);
        assert_eq!(stats.file_count, 4);
    }
}
