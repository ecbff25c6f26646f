//! Folder handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use vault_entity::Folder;
use vault_service::FolderDeletion;

use crate::dto::request::CreateFolderRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ListingParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/folders?owner
pub async fn list_folders(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListingParams>,
) -> Result<Json<ApiResponse<Vec<Folder>>>, ApiError> {
    let folders = state.catalog.all_folders(params.owner()?).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Folder>>), ApiError> {
    let folder = state
        .mutations
        .create_folder(auth.context(), &body.name, body.owner, body.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.catalog.get_folder(id).await?)))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FolderDeletion>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.mutations.delete_folder(id).await?)))
}
