//! Listing and traversal limits.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Catalog query and mutation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Page size used when a paged listing does not ask for one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Largest page size a caller may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// How many `head` verifications a batch registration runs at once.
    #[serde(default = "default_verify_chunk_size")]
    pub verify_chunk_size: usize,
    /// Bound on ancestor and descendant walks over the folder tree.
    #[serde(default = "default_max_folder_depth")]
    pub max_folder_depth: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            verify_chunk_size: default_verify_chunk_size(),
            max_folder_depth: default_max_folder_depth(),
        }
    }
}

impl CatalogConfig {
    /// Reject zero sizes, which would stall pagination or verification.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.default_page_size == 0 || self.max_page_size < self.default_page_size {
            return Err(AppError::configuration(
                "catalog page sizes must satisfy 0 < default_page_size <= max_page_size",
            ));
        }
        if self.verify_chunk_size == 0 {
            return Err(AppError::configuration(
                "catalog.verify_chunk_size must be positive",
            ));
        }
        if self.max_folder_depth == 0 {
            return Err(AppError::configuration(
                "catalog.max_folder_depth must be positive",
            ));
        }
        Ok(())
    }

    /// Clamp a requested page size into the accepted range.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    200
}

fn default_verify_chunk_size() -> usize {
    5
}

fn default_max_folder_depth() -> usize {
    256
}
