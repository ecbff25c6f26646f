//! Route definitions for the vault HTTP API.
//!
//! All routes are mounted under `/api`. Everything except login, logout,
//! and the health check sits behind the session middleware.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let local_blobs = state.objects.provider_type() == "local";

    let mut protected = Router::new()
        .merge(session_routes())
        .merge(entry_routes())
        .merge(file_routes())
        .merge(folder_routes())
        .merge(tag_routes())
        .merge(upload_routes())
        .merge(media_routes());
    if local_blobs {
        protected = protected.merge(blob_routes());
    }
    let protected = protected.route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::require_session,
    ));

    let api_routes = Router::new()
        .merge(public_routes())
        .merge(protected);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Health, login, and logout
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
}

fn session_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(handlers::auth::me))
}

/// Directory listing, rename, and batch transitions
fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(handlers::entries::list_entries))
        .route("/entries/rename", patch(handlers::entries::rename))
        .route("/entries/trash", post(handlers::entries::trash))
        .route("/entries/restore", post(handlers::entries::restore))
        .route("/entries/delete", post(handlers::entries::delete))
        .route("/entries/move", post(handlers::entries::move_entries))
}

/// File listings, lookup, single-file transitions, tags, URLs
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::files::list_files))
        .route("/files/paged", get(handlers::files::list_files_paged))
        .route(
            "/files/{id}",
            get(handlers::files::get_file).delete(handlers::files::delete_file),
        )
        .route("/files/{id}/nav", get(handlers::files::sibling_nav))
        .route("/files/{id}/move", patch(handlers::files::move_file))
        .route("/files/{id}/trash", post(handlers::files::trash_file))
        .route("/files/{id}/restore", post(handlers::files::restore_file))
        .route("/files/{id}/tags", post(handlers::files::add_tag))
        .route(
            "/files/{id}/tags/{tag_id}",
            axum::routing::delete(handlers::files::remove_tag),
        )
        .route("/files/{id}/url", get(handlers::files::file_url))
}

/// Folder CRUD
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folders::list_folders).post(handlers::folders::create_folder),
        )
        .route(
            "/folders/{id}",
            get(handlers::folders::get_folder).delete(handlers::folders::delete_folder),
        )
}

/// Tag lifecycle
fn tag_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route(
            "/tags/{id}",
            patch(handlers::tags::update_tag).delete(handlers::tags::delete_tag),
        )
}

/// Direct, presigned, and batch uploads
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/uploads", post(handlers::uploads::upload_direct))
        .route("/uploads/presign", post(handlers::uploads::presign))
        .route("/uploads/register", post(handlers::uploads::register))
        .route(
            "/uploads/register-batch",
            post(handlers::uploads::register_batch),
        )
}

/// Streaming, downloads, stats
fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/media/{id}", get(handlers::media::stream_media))
        .route("/download/{id}", get(handlers::media::download))
        .route("/stats", get(handlers::media::storage_stats))
}

/// Targets of local presigned URLs
fn blob_routes() -> Router<AppState> {
    Router::new().route(
        "/blobs/{key}",
        get(handlers::media::get_blob).put(handlers::media::put_blob),
    )
}
