//! References to catalog entries of either kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Whether an entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = vault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            _ => Err(vault_core::AppError::validation(format!(
                "Invalid entry type: '{s}'. Expected one of: file, folder"
            ))),
        }
    }
}

/// A tagged `{id, type}` item in a batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl EntryRef {
    pub fn file(id: Uuid) -> Self {
        Self {
            id,
            kind: EntryKind::File,
        }
    }

    pub fn folder(id: Uuid) -> Self {
        Self {
            id,
            kind: EntryKind::Folder,
        }
    }
}
