//! Typed path and query value helpers.

use uuid::Uuid;

use vault_core::error::AppError;
use vault_database::FolderScope;

/// Parses a UUID from a path segment or query value.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid UUID: {s}")))
}

/// Parses a `parentId` value: `root` or a folder id.
pub fn parse_parent(s: &str) -> Result<FolderScope, AppError> {
    if s.eq_ignore_ascii_case("root") {
        Ok(FolderScope::Root)
    } else {
        parse_uuid(s).map(FolderScope::Folder)
    }
}
