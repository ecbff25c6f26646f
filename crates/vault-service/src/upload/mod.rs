//! Upload pipeline: direct, presigned, and batch registration.

pub mod service;
pub mod verify;

pub use service::{DirectUpload, PendingUpload, PresignedUpload, UploadService};
