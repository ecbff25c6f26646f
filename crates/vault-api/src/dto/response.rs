//! Response DTOs.

use serde::{Deserialize, Serialize};

use vault_entity::Owner;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `connected` or `unavailable`.
    pub database: String,
    /// Object store provider name.
    pub storage: String,
}

/// The identity behind the current session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub owner: Owner,
}

/// A presigned or local URL for a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlResponse {
    pub url: String,
}
