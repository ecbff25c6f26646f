//! # vault-core
//!
//! Core crate for the media vault. Contains the unified error system,
//! configuration schemas, the object store contract, and the cursor and
//! byte-range types shared by the catalog and the HTTP layer.
//!
//! This crate has **no** internal dependencies on other vault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
