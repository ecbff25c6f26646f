//! Construction of the configured object store backend.

use std::sync::Arc;

use tracing::info;

use vault_core::config::storage::{StorageConfig, StorageProviderKind};
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::storage::ObjectStore;

/// Build the object store selected by `storage.provider`.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.provider {
        #[cfg(feature = "local")]
        StorageProviderKind::Local => Arc::new(
            crate::providers::local::LocalObjectStore::new(
                &config.local.root_path,
                &config.local.public_base_url,
            )
            .await?,
        ),
        #[cfg(feature = "s3")]
        StorageProviderKind::S3 => Arc::new(crate::providers::s3::S3ObjectStore::new(config).await?),
        #[allow(unreachable_patterns)]
        other => {
            return Err(AppError::configuration(format!(
                "Storage provider {other:?} is not compiled into this build"
            )));
        }
    };
    info!(provider = store.provider_type(), "Object store ready");
    Ok(store)
}
