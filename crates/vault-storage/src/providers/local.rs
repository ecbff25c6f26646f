//! Local filesystem object store.
//!
//! Each blob is a file named after its key under the root directory, with
//! its content type kept in a `.type` sidecar so `head` can report it.

use std::io::SeekFrom;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::debug;

use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_core::traits::storage::{ObjectBody, ObjectHead, ObjectStore};
use vault_core::types::range::ByteRange;

const TYPE_SUFFIX: &str = ".type";

/// Object store backed by a directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory for all blobs.
    root: PathBuf,
    /// Base URL that presigned URLs are built on.
    public_base_url: String,
}

impl LocalObjectStore {
    /// Create a store rooted at the given path, creating it if needed.
    pub async fn new(root_path: &str, public_base_url: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a key to a path inside the root.
    ///
    /// Keys are flat: separators, parent references, and empty keys are
    /// rejected.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.ends_with(TYPE_SUFFIX)
            && !key.contains(['/', '\\', '\0']);
        if !valid {
            return Err(AppError::validation(format!("Invalid object key: '{key}'")));
        }
        Ok(self.root.join(key))
    }

    fn type_path(path: &std::path::Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(TYPE_SUFFIX);
        PathBuf::from(name)
    }

    async fn read_type(path: &std::path::Path) -> Option<String> {
        fs::read_to_string(Self::type_path(path))
            .await
            .ok()
            .filter(|t| !t.is_empty())
    }
}

fn io_error(action: &str, key: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Object not found: {key}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action} object: {key}"), e)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        fs::write(&path, &data)
            .await
            .map_err(|e| io_error("write", key, e))?;
        fs::write(Self::type_path(&path), content_type)
            .await
            .map_err(|e| io_error("write", key, e))?;
        debug!(key, bytes = data.len(), "Wrote local object");
        Ok(())
    }

    async fn get(&self, key: &str, range: Option<ByteRange>) -> AppResult<ObjectBody> {
        let path = self.resolve(key)?;
        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| io_error("open", key, e))?;
        let total_size = file
            .metadata()
            .await
            .map_err(|e| io_error("stat", key, e))?
            .len();
        let content_type = Self::read_type(&path).await;

        let resolved = range.map(|r| r.resolve(total_size)).transpose()?;
        let body = match resolved {
            Some(r) => {
                file.seek(SeekFrom::Start(r.start))
                    .await
                    .map_err(|e| io_error("seek", key, e))?;
                ReaderStream::new(file.take(r.len())).boxed()
            }
            None => ReaderStream::new(file).boxed(),
        };

        Ok(ObjectBody {
            body,
            content_type,
            content_length: resolved.map_or(total_size, |r| r.len()),
            total_size,
            range: resolved,
        })
    }

    async fn head(&self, key: &str) -> AppResult<Option<ObjectHead>> {
        let path = self.resolve(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(Some(ObjectHead {
                size: meta.len(),
                content_type: Self::read_type(&path).await,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("stat", key, e)),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        for target in [Self::type_path(&path), path] {
            match fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error("delete", key, e)),
            }
        }
        debug!(key, "Deleted local object");
        Ok(())
    }

    async fn presign_upload(&self, key: &str, _content_type: &str) -> AppResult<String> {
        self.resolve(key)?;
        Ok(format!("{}/{key}", self.public_base_url))
    }

    async fn presign_download(&self, key: &str, filename: Option<&str>) -> AppResult<String> {
        self.resolve(key)?;
        Ok(match filename {
            Some(_) => format!("{}/{key}?download=1", self.public_base_url),
            None => format!("{}/{key}", self.public_base_url),
        })
    }
}
