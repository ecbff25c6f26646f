//! Shared application state passed to every handler.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use vault_core::config::AppConfig;
use vault_core::traits::storage::ObjectStore;
use vault_database::CatalogStore;
use vault_service::{CatalogService, MediaService, MutationService, UploadService};

/// Application state, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Catalog store, used directly by the health check.
    pub store: Arc<dyn CatalogStore>,
    /// Object store, used directly by the local blob routes.
    pub objects: Arc<dyn ObjectStore>,
    /// Key signing the session cookie.
    pub cookie_key: Key,
    pub catalog: CatalogService,
    pub mutations: MutationService,
    pub uploads: UploadService,
    pub media: MediaService,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
