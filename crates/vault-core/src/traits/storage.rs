//! Object store contract for blob bytes.
//!
//! Blobs are keyed by the file id. The catalog never stores bytes and the
//! object store never stores catalog metadata.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::range::{ByteRange, ResolvedRange};

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Result of a `head` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    /// Stored size in bytes.
    pub size: u64,
    /// Content type recorded at upload time.
    pub content_type: Option<String>,
}

/// Body of a `get`, possibly a partial range.
pub struct ObjectBody {
    /// The bytes, streamed.
    pub body: ByteStream,
    /// Content type recorded at upload time.
    pub content_type: Option<String>,
    /// Number of bytes in `body`.
    pub content_length: u64,
    /// Size of the whole object.
    pub total_size: u64,
    /// The range served, when the request asked for one.
    pub range: Option<ResolvedRange>,
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("total_size", &self.total_size)
            .field("range", &self.range)
            .finish()
    }
}

impl ObjectBody {
    /// Value for a `Content-Range` response header, if this is a partial body.
    pub fn content_range(&self) -> Option<String> {
        self.range
            .map(|r| format!("bytes {}-{}/{}", r.start, r.end, self.total_size))
    }
}

/// Trait for blob storage backends.
///
/// Implementations exist for S3-compatible services and the local
/// filesystem. The trait is defined here in `vault-core` and implemented
/// in `vault-storage`.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Store `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()>;

    /// Read an object, optionally restricted to a byte range.
    ///
    /// Returns a `NotFound` error when the key does not exist and a
    /// `RangeNotSatisfiable` error when the range lies outside the object.
    async fn get(&self, key: &str, range: Option<ByteRange>) -> AppResult<ObjectBody>;

    /// Stored size and type of an object, or `None` when it does not exist.
    async fn head(&self, key: &str) -> AppResult<Option<ObjectHead>>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Time-bounded URL the client can `PUT` the object to directly.
    async fn presign_upload(&self, key: &str, content_type: &str) -> AppResult<String>;

    /// Time-bounded URL for reading the object. With a filename the
    /// response is served as an attachment under that name.
    async fn presign_download(&self, key: &str, filename: Option<&str>) -> AppResult<String>;
}

/// `Content-Disposition` value for serving an object as a named attachment.
pub fn attachment_disposition(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{sanitized}\"")
}
