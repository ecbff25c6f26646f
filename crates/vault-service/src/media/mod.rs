//! Reading blobs back: presigned links, ranged streams, and usage totals.

pub mod service;

pub use service::{MediaService, StorageStats};
