//! # vault-storage
//!
//! Object store backends for the media vault: an S3-compatible store for
//! production (AWS, R2, MinIO) and a filesystem store for development and
//! tests. Both implement [`vault_core::traits::ObjectStore`].

pub mod factory;
pub mod providers;

pub use factory::build_object_store;
#[cfg(feature = "local")]
pub use providers::local::LocalObjectStore;
#[cfg(feature = "s3")]
pub use providers::s3::S3ObjectStore;
