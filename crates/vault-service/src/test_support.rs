//! Shared fixtures for service tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use uuid::Uuid;

use vault_core::config::catalog::CatalogConfig;
use vault_core::error::AppError;
use vault_core::result::AppResult;
use vault_core::traits::storage::{ObjectBody, ObjectHead, ObjectStore};
use vault_core::types::range::ByteRange;
use vault_database::{CatalogStore, MemoryCatalogStore, WriteOp};
use vault_entity::file::NewFile;
use vault_entity::{Category, File, Folder, Owner};
use vault_storage::LocalObjectStore;

use crate::{CatalogService, MediaService, MutationService, UploadService};

/// Local store wrapper whose deletes can be made to fail per key.
#[derive(Debug)]
pub struct FlakyObjectStore {
    inner: LocalObjectStore,
    failing_deletes: Mutex<HashSet<String>>,
}

impl FlakyObjectStore {
    pub fn fail_delete(&self, key: Uuid) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }
}

#[async_trait]
impl ObjectStore for FlakyObjectStore {
    fn provider_type(&self) -> &str {
        "flaky"
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str, range: Option<ByteRange>) -> AppResult<ObjectBody> {
        self.inner.get(key, range).await
    }

    async fn head(&self, key: &str) -> AppResult<Option<ObjectHead>> {
        self.inner.head(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if self.failing_deletes.lock().unwrap().contains(key) {
            return Err(AppError::store_unavailable(format!("delete of {key} refused")));
        }
        self.inner.delete(key).await
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> AppResult<String> {
        self.inner.presign_upload(key, content_type).await
    }

    async fn presign_download(&self, key: &str, filename: Option<&str>) -> AppResult<String> {
        self.inner.presign_download(key, filename).await
    }
}

pub struct Fixture {
    _dir: TempDir,
    pub store: Arc<MemoryCatalogStore>,
    pub objects: Arc<FlakyObjectStore>,
    pub config: CatalogConfig,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let inner = LocalObjectStore::new(dir.path().to_str().unwrap(), "http://blobs.test")
            .await
            .unwrap();
        Self {
            _dir: dir,
            store: Arc::new(MemoryCatalogStore::new()),
            objects: Arc::new(FlakyObjectStore {
                inner,
                failing_deletes: Mutex::new(HashSet::new()),
            }),
            config: CatalogConfig::default(),
        }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.store.clone(), self.config.clone())
    }

    pub fn mutations(&self) -> MutationService {
        MutationService::new(self.store.clone(), self.objects.clone(), self.config.clone())
    }

    pub fn uploads(&self) -> UploadService {
        UploadService::new(self.store.clone(), self.objects.clone(), self.config.clone())
    }

    pub fn media(&self) -> MediaService {
        MediaService::new(self.store.clone(), self.objects.clone(), 1_000_000)
    }

    pub async fn folder(&self, name: &str, parent_id: Option<Uuid>) -> Folder {
        let folder = Folder::new(name, Owner::Wise, parent_id);
        self.store
            .execute_batch(vec![WriteOp::InsertFolder(folder.clone())])
            .await
            .unwrap();
        folder
    }

    /// Insert a file row and store a blob of `size` bytes under its id.
    pub async fn file_with(&self, name: &str, folder_id: Option<Uuid>, category: Category, size: usize) -> File {
        let file = NewFile {
            id: Uuid::now_v7(),
            name: name.to_string(),
            folder_id,
            category,
            mime_type: "application/octet-stream".to_string(),
            size_bytes: size as i64,
            owner: Owner::Wise,
            original_name: None,
            thumbnail_id: None,
        }
        .into_file();
        self.put_blob(file.id, size).await;
        self.store
            .execute_batch(vec![WriteOp::InsertFile(file.clone())])
            .await
            .unwrap();
        file
    }

    pub async fn file(&self, name: &str, folder_id: Option<Uuid>) -> File {
        self.file_with(name, folder_id, Category::Media, 16).await
    }

    /// A media file with a linked `SYSTEM` preview in the same folder.
    pub async fn file_with_thumbnail(&self, name: &str, folder_id: Option<Uuid>) -> (File, File) {
        let thumb = self
            .file_with(&format!("{name}.thumb"), folder_id, Category::System, 4)
            .await;
        let mut file = NewFile {
            id: Uuid::now_v7(),
            name: name.to_string(),
            folder_id,
            category: Category::Media,
            mime_type: "video/mp4".to_string(),
            size_bytes: 32,
            owner: Owner::Wise,
            original_name: None,
            thumbnail_id: Some(thumb.id),
        }
        .into_file();
        file.status = vault_entity::FileStatus::Archived;
        self.put_blob(file.id, 32).await;
        self.store
            .execute_batch(vec![WriteOp::InsertFile(file.clone())])
            .await
            .unwrap();
        (file, thumb)
    }

    pub async fn put_blob(&self, id: Uuid, size: usize) {
        self.objects
            .put(&id.to_string(), Bytes::from(vec![7u8; size]), "application/octet-stream")
            .await
            .unwrap();
    }

    pub async fn blob_exists(&self, id: Uuid) -> bool {
        self.objects.head(&id.to_string()).await.unwrap().is_some()
    }
}
