//! # vault-entity
//!
//! Domain entity models for the media vault. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod entry;
pub mod file;
pub mod folder;
pub mod owner;
pub mod tag;

use chrono::{DateTime, SubsecRound, Utc};

pub use entry::{EntryKind, EntryRef};
pub use file::{Category, File, FileStatus, FileWithTags};
pub use folder::Folder;
pub use owner::Owner;
pub use tag::{Tag, TagStatus, TagSummary, TagWithUsage};

/// Current time at the precision PostgreSQL stores.
///
/// Rows are compared by timestamp during keyset pagination, so an in-memory
/// value must equal what a round trip through the database returns.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
