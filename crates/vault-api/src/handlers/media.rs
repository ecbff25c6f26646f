//! Media streaming, downloads, storage statistics, and the local blob
//! endpoints that presigned URLs point at when blobs live on disk.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use vault_core::error::{AppError, ErrorKind};
use vault_core::traits::storage::{ObjectBody, attachment_disposition};
use vault_core::types::ByteRange;
use vault_service::StorageStats;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::extractors::path::parse_uuid;
use crate::state::AppState;

/// The single range a request asks for.
///
/// A header that cannot be parsed, or asks for several ranges, is ignored
/// and the whole object is served.
fn requested_range(headers: &HeaderMap) -> Option<ByteRange> {
    let raw = headers.get(header::RANGE)?.to_str().ok()?;
    ByteRange::parse(raw)
        .inspect_err(|e| debug!(range = raw, error = %e, "Ignoring Range header"))
        .ok()
}

/// Turn an object body into a `200` or `206` response.
fn body_response(body: ObjectBody, fallback_type: &str, disposition: Option<String>) -> Result<Response, AppError> {
    let status = if body.range.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };
    let content_type = body.content_type.clone().unwrap_or_else(|| fallback_type.to_string());

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, body.content_length)
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(range) = body.content_range() {
        builder = builder.header(header::CONTENT_RANGE, range);
    }
    if let Some(value) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, value);
    }
    builder
        .body(Body::from_stream(body.body))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

/// A `416` carrying the size the client may ask for.
fn unsatisfiable(err: AppError, total_size: i64) -> Response {
    let mut response = ApiError(err).into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{total_size}")) {
        response.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    response
}

/// GET /api/media/{id}
pub async fn stream_media(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    match state.media.stream(id, requested_range(&headers)).await {
        Ok((file, body)) => Ok(body_response(body, &file.mime_type, None)?),
        Err(e) if e.kind == ErrorKind::RangeNotSatisfiable => {
            let file = state.catalog.get_file(id).await?;
            Ok(unsatisfiable(e, file.file.size_bytes))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/download/{id}
pub async fn download(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (file, body) = state.media.stream(id, None).await?;
    let disposition = attachment_disposition(&file.original_name);
    Ok(body_response(body, &file.mime_type, Some(disposition))?)
}

/// GET /api/stats
pub async fn storage_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<StorageStats>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.media.storage_stats().await?)))
}

#[derive(Debug, Deserialize)]
pub struct BlobParams {
    #[serde(default)]
    pub download: Option<String>,
}

/// PUT /api/blobs/{key}
///
/// Upload target of a presigned URL issued by the local object store.
pub async fn put_blob(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
    headers: HeaderMap,
    data: Bytes,
) -> Result<StatusCode, ApiError> {
    parse_uuid(&key)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let size = data.len();
    state.objects.put(&key, data, content_type).await?;
    info!(key, owner = %auth.owner, size_bytes = size, "Blob stored through local upload URL");
    Ok(StatusCode::OK)
}

/// GET /api/blobs/{key}
pub async fn get_blob(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(key): Path<String>,
    Query(params): Query<BlobParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let id = parse_uuid(&key)?;
    let disposition = match params.download {
        Some(_) => {
            let file = state.catalog.get_file(id).await?;
            Some(attachment_disposition(&file.file.original_name))
        }
        None => None,
    };
    let body = state.objects.get(&key, requested_range(&headers)).await?;
    Ok(body_response(body, "application/octet-stream", disposition)?)
}
