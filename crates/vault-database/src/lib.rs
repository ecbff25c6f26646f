//! # vault-database
//!
//! The catalog store: folders, files, tags, and the links between files and
//! tags. [`CatalogStore`] is the contract the services depend on. It is
//! implemented over PostgreSQL by [`PgCatalogStore`] and in process by
//! [`MemoryCatalogStore`], which backs development mode and the tests.

pub mod batch;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod query;
pub mod repositories;
pub mod store;

pub use batch::WriteOp;
pub use connection::DatabasePool;
pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;
pub use query::{FileQuery, FolderScope, TagFilter, View};
pub use store::{CatalogStore, StorageUsage};
