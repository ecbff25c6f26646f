//! Object storage configuration.

use serde::{Deserialize, Serialize};

/// Which object store backend holds blob bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderKind {
    /// S3-compatible service (AWS, R2, MinIO).
    S3,
    /// Directory on the local filesystem.
    Local,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to use.
    #[serde(default = "default_provider")]
    pub provider: StorageProviderKind,
    /// Lifetime of presigned upload and download URLs.
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_seconds: u64,
    /// Advertised capacity used by storage statistics (default 100 GiB).
    #[serde(default = "default_capacity")]
    pub capacity_bytes: u64,
    /// Local filesystem backend settings.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible backend settings.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            presign_expiry_seconds: default_presign_expiry(),
            capacity_bytes: default_capacity(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for blob files.
    #[serde(default = "default_local_root")]
    pub root_path: String,
    /// Base URL that presigned URLs are built on.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// Endpoint URL for non-AWS services such as R2 or MinIO.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Region (R2 uses `auto`).
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID. Falls back to the default credential chain when unset.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Use path-style addressing (required by most S3-compatible services).
    #[serde(default = "default_true")]
    pub force_path_style: bool,
    /// Payloads at or above this size use multipart upload.
    #[serde(default = "default_multipart_threshold")]
    pub multipart_threshold_bytes: u64,
    /// Part size for multipart uploads (S3 minimum is 5 MiB).
    #[serde(default = "default_part_size")]
    pub multipart_part_size_bytes: u64,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            bucket: String::new(),
            access_key_id: None,
            secret_access_key: None,
            force_path_style: true,
            multipart_threshold_bytes: default_multipart_threshold(),
            multipart_part_size_bytes: default_part_size(),
        }
    }
}

fn default_provider() -> StorageProviderKind {
    StorageProviderKind::Local
}

fn default_presign_expiry() -> u64 {
    3600
}

fn default_capacity() -> u64 {
    100 * 1024 * 1024 * 1024
}

fn default_local_root() -> String {
    "./data/blobs".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/api/blobs".to_string()
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

fn default_multipart_threshold() -> u64 {
    16 * 1024 * 1024
}

fn default_part_size() -> u64 {
    8 * 1024 * 1024
}
