//! Tag lifecycle handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use vault_entity::{Tag, TagWithUsage};
use vault_service::{TagDeleteMode, TagListFilter};

use crate::dto::request::{CreateTagRequest, UpdateTagRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TagListParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagDeleteParams {
    pub mode: Option<String>,
}

/// GET /api/tags?status
pub async fn list_tags(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<TagListParams>,
) -> Result<Json<ApiResponse<Vec<TagWithUsage>>>, ApiError> {
    let filter = params
        .status
        .as_deref()
        .map_or(Ok(TagListFilter::default()), str::parse)?;
    Ok(Json(ApiResponse::ok(state.catalog.list_tags(filter).await?)))
}

/// POST /api/tags
pub async fn create_tag(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Tag>>), ApiError> {
    let tag = state
        .mutations
        .create_tag(&body.name, body.color.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tag))))
}

/// PATCH /api/tags/{id}
pub async fn update_tag(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTagRequest>,
) -> Result<Json<ApiResponse<Tag>>, ApiError> {
    let tag = state
        .mutations
        .update_tag(id, body.name.as_deref(), body.color.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(tag)))
}

/// DELETE /api/tags/{id}?mode=trash|restore|permanent
pub async fn delete_tag(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<TagDeleteParams>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mode = params
        .mode
        .as_deref()
        .map_or(Ok(TagDeleteMode::default()), str::parse)?;
    state.mutations.delete_tag(id, mode).await?;
    Ok(Json(ApiResponse::ok(())))
}
