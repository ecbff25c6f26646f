//! File listing, lookup, single-file transitions, and file tags.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use vault_core::types::Page;
use vault_entity::{FileWithTags, TagSummary};
use vault_service::SiblingNav;

use crate::dto::request::{AddTagRequest, MoveFileRequest};
use crate::dto::response::{ApiResponse, UrlResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ListingParams, PagedParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/files?view&tagId&owner
pub async fn list_files(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListingParams>,
) -> Result<Json<ApiResponse<Vec<FileWithTags>>>, ApiError> {
    let files = state
        .catalog
        .list_files_flat(params.owner()?, params.view()?, params.tag()?)
        .await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// GET /api/files/paged?view&tagId&owner&parentId&cursor&limit
pub async fn list_files_paged(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<PagedParams>,
) -> Result<Json<ApiResponse<Page<FileWithTags>>>, ApiError> {
    let page = state.catalog.list_files_paged(params.into_query()?).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileWithTags>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.catalog.get_file(id).await?)))
}

/// GET /api/files/{id}/nav?view&tagId
pub async fn sibling_nav(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ApiResponse<SiblingNav>>, ApiError> {
    let nav = state
        .catalog
        .sibling_nav(id, params.view()?, params.tag()?)
        .await?;
    Ok(Json(ApiResponse::ok(nav)))
}

/// POST /api/files/{id}/trash
pub async fn trash_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.mutations.trash_file(id).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// POST /api/files/{id}/restore
pub async fn restore_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.mutations.restore_file(id).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.mutations.permanent_delete_file(id).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// PATCH /api/files/{id}/move
pub async fn move_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveFileRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.mutations.move_file(id, body.folder_id).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// POST /api/files/{id}/tags
pub async fn add_tag(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<AddTagRequest>,
) -> Result<Json<ApiResponse<TagSummary>>, ApiError> {
    let tag = state.mutations.add_tag_to_file(id, &body.tag_name).await?;
    Ok(Json(ApiResponse::ok(tag)))
}

/// DELETE /api/files/{id}/tags/{tag_id}
pub async fn remove_tag(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.mutations.remove_tag_from_file(id, tag_id).await?;
    Ok(Json(ApiResponse::ok(())))
}

#[derive(Debug, Deserialize)]
pub struct UrlParams {
    #[serde(default)]
    pub download: bool,
}

/// GET /api/files/{id}/url?download
pub async fn file_url(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<UrlParams>,
) -> Result<Json<ApiResponse<UrlResponse>>, ApiError> {
    let url = if params.download {
        state.media.download_url(id).await?
    } else {
        state.media.media_url(id).await?
    };
    Ok(Json(ApiResponse::ok(UrlResponse { url })))
}
