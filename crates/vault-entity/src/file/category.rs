//! File category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of file categories.
///
/// `System` marks generated preview images. Those rows are linked from
/// their parent through `File::thumbnail_id` and hidden from every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Encrypted,
    Media,
    Log,
    Audio,
    Admin,
    System,
    ProxyLog,
}

impl Category {
    /// Return the category as it is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encrypted => "ENCRYPTED",
            Self::Media => "MEDIA",
            Self::Log => "LOG",
            Self::Audio => "AUDIO",
            Self::Admin => "ADMIN",
            Self::System => "SYSTEM",
            Self::ProxyLog => "PROXY_LOG",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Log
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = vault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ENCRYPTED" => Ok(Self::Encrypted),
            "MEDIA" => Ok(Self::Media),
            "LOG" => Ok(Self::Log),
            "AUDIO" => Ok(Self::Audio),
            "ADMIN" => Ok(Self::Admin),
            "SYSTEM" => Ok(Self::System),
            "PROXY_LOG" => Ok(Self::ProxyLog),
            _ => Err(vault_core::AppError::validation(format!(
                "Invalid category: '{s}'. Expected one of: ENCRYPTED, MEDIA, LOG, AUDIO, ADMIN, SYSTEM, PROXY_LOG"
            ))),
        }
    }
}
