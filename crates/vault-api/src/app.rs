//! Application builder: wires stores, services, router, and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_extra::extract::cookie::Key;
use tracing::{info, warn};

use vault_core::config::AppConfig;
use vault_core::error::{AppError, ErrorKind};
use vault_core::result::AppResult;
use vault_core::traits::storage::ObjectStore;
use vault_database::{CatalogStore, DatabasePool, MemoryCatalogStore, PgCatalogStore};
use vault_service::{CatalogService, MediaService, MutationService, UploadService};

use crate::router::build_router;
use crate::state::AppState;

/// Catalog store selected by `database.url`, plus the pool to close on exit.
async fn open_catalog(config: &AppConfig) -> AppResult<(Arc<dyn CatalogStore>, Option<DatabasePool>)> {
    if config.database.is_memory() {
        warn!("Using the in-memory catalog store; nothing will persist");
        return Ok((Arc::new(MemoryCatalogStore::new()), None));
    }
    let pool = DatabasePool::connect(&config.database).await?;
    vault_database::migration::run_migrations(pool.pool()).await?;
    let store = PgCatalogStore::new(pool.pool().clone());
    Ok((Arc::new(store), Some(pool)))
}

/// Assemble the state handlers run against.
pub fn build_state(
    config: AppConfig,
    store: Arc<dyn CatalogStore>,
    objects: Arc<dyn ObjectStore>,
) -> AppResult<AppState> {
    let cookie_key = Key::try_from(config.auth.cookie_secret.as_bytes()).map_err(|e| {
        AppError::configuration(format!("auth.cookie_secret cannot sign cookies: {e}"))
    })?;
    let catalog_config = config.catalog.clone();

    Ok(AppState {
        catalog: CatalogService::new(store.clone(), catalog_config.clone()),
        mutations: MutationService::new(store.clone(), objects.clone(), catalog_config.clone()),
        uploads: UploadService::new(store.clone(), objects.clone(), catalog_config),
        media: MediaService::new(store.clone(), objects.clone(), config.storage.capacity_bytes),
        config: Arc::new(config),
        store,
        objects,
        cookie_key,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the vault server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!("Starting vault server...");

    let (store, pool) = open_catalog(&config).await?;
    let objects = vault_storage::build_object_store(&config.storage).await?;
    info!(provider = objects.provider_type(), "Object store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_app(build_state(config, store, objects)?);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, format!("Failed to bind {addr}"), e)
    })?;
    info!("Vault server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    info!("Vault server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, then arms a hard deadline for in-flight
/// requests.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(grace_seconds = grace.as_secs(), "Shutdown signal received, draining requests");
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!("Shutdown grace period elapsed, exiting");
        std::process::exit(0);
    });
}
