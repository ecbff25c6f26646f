//! # vault-service
//!
//! Business logic for the media vault. Each service is constructed with the
//! catalog store and object store it needs, held as `Arc<dyn ...>`, and is
//! cheap to clone into request handlers.
//!
//! - [`CatalogService`]: listings, pagination, sibling navigation, lookups.
//! - [`MutationService`]: folder and file state transitions, batch
//!   variants, and the tag lifecycle.
//! - [`UploadService`]: direct, presigned, and batch uploads, each verified
//!   against the object store before any catalog row is written.
//! - [`MediaService`]: presigned URLs, streaming, and storage statistics.

pub mod catalog;
pub mod context;
pub mod folder;
pub mod media;
pub mod mutation;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{CatalogService, Entries, PagedFilesQuery, SiblingNav, TagListFilter};
pub use context::RequestContext;
pub use folder::FolderTree;
pub use media::{MediaService, StorageStats};
pub use mutation::{BatchOutcome, FolderDeletion, ItemFailure, MutationService, TagDeleteMode};
pub use upload::{DirectUpload, PendingUpload, PresignedUpload, UploadService};
