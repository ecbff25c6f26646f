//! Directory listing, rename, and batch entry handlers.

use axum::Json;
use axum::extract::{Query, State};
use tracing::info;

use vault_database::FolderScope;
use vault_service::{BatchOutcome, Entries};

use crate::dto::request::{EntriesRequest, MoveEntriesRequest, RenameRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ListingParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/entries?parentId&tagId&owner
pub async fn list_entries(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListingParams>,
) -> Result<Json<ApiResponse<Entries>>, ApiError> {
    let parent_id = match params.scope_or(FolderScope::Root)? {
        FolderScope::Folder(id) => Some(id),
        FolderScope::Root | FolderScope::Any => None,
    };
    let entries = state
        .catalog
        .list_entries(params.owner()?, parent_id, params.tag()?)
        .await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// PATCH /api/entries/rename
pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<RenameRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.mutations.rename_entry(body.kind, body.id, &body.name).await?;
    info!(owner = %auth.owner, id = %body.id, kind = %body.kind, "Entry renamed");
    Ok(Json(ApiResponse::ok(())))
}

/// POST /api/entries/trash
pub async fn trash(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(body): ValidatedJson<EntriesRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    Ok(Json(state.mutations.trash_entries(&body.items).await?))
}

/// POST /api/entries/restore
pub async fn restore(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(body): ValidatedJson<EntriesRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    Ok(Json(state.mutations.restore_entries(&body.items).await?))
}

/// POST /api/entries/delete
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(body): ValidatedJson<EntriesRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    Ok(Json(state.mutations.permanent_delete_entries(&body.items).await?))
}

/// POST /api/entries/move
pub async fn move_entries(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(body): ValidatedJson<MoveEntriesRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    Ok(Json(
        state
            .mutations
            .move_entries(&body.items, body.target_folder_id)
            .await?,
    ))
}
