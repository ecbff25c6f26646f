//! File status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a file. `Deleted` is the soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    Active,
    Warning,
    Synced,
    Archived,
    Deleted,
    Encrypted,
}

impl FileStatus {
    /// Whether the file sits in the trash.
    pub fn is_trashed(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Return the status as it is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Warning => "WARNING",
            Self::Synced => "SYNCED",
            Self::Archived => "ARCHIVED",
            Self::Deleted => "DELETED",
            Self::Encrypted => "ENCRYPTED",
        }
    }
}

impl Default for FileStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = vault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "WARNING" => Ok(Self::Warning),
            "SYNCED" => Ok(Self::Synced),
            "ARCHIVED" => Ok(Self::Archived),
            "DELETED" => Ok(Self::Deleted),
            "ENCRYPTED" => Ok(Self::Encrypted),
            _ => Err(vault_core::AppError::validation(format!(
                "Invalid file status: '{s}'. Expected one of: ACTIVE, WARNING, SYNCED, ARCHIVED, DELETED, ENCRYPTED"
            ))),
        }
    }
}
