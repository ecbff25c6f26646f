//! Upload pipeline handlers.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::Bytes;

use vault_core::error::AppError;
use vault_entity::{Category, File};
use vault_service::{BatchOutcome, DirectUpload, PendingUpload, PresignedUpload};

use crate::dto::request::{PresignRequest, RegisterBatchRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::path::parse_uuid;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation(format!("Malformed multipart body: {}", e.body_text()))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Collect the fields of a direct upload.
///
/// `file` carries the bytes; `name`, `folderId`, `owner`, `category`,
/// `size`, `originalName`, and `thumbnailId` are optional text fields.
async fn read_direct_upload(mut multipart: Multipart) -> Result<DirectUpload, AppError> {
    let mut data: Option<Bytes> = None;
    let mut file_name = None;
    let mut mime_type = None;
    let mut upload = DirectUpload {
        name: String::new(),
        mime_type: None,
        data: Bytes::new(),
        declared_size: None,
        folder_id: None,
        owner: None,
        category: Category::default(),
        original_name: None,
        thumbnail_id: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "file" {
            file_name = field.file_name().map(str::to_string);
            mime_type = field.content_type().map(str::to_string);
            data = Some(field.bytes().await.map_err(multipart_error)?);
            continue;
        }
        let Some(value) = non_empty(field.text().await.map_err(multipart_error)?) else {
            continue;
        };
        match name.as_str() {
            "name" => upload.name = value,
            "folderId" => upload.folder_id = Some(parse_uuid(&value)?),
            "owner" => upload.owner = Some(value.parse()?),
            "category" => upload.category = value.parse()?,
            "size" => {
                upload.declared_size = Some(
                    value
                        .parse()
                        .map_err(|_| AppError::validation(format!("Invalid size: '{value}'")))?,
                )
            }
            "originalName" => upload.original_name = Some(value),
            "thumbnailId" => upload.thumbnail_id = Some(parse_uuid(&value)?),
            _ => {}
        }
    }

    upload.data = data.ok_or_else(|| AppError::validation("Missing 'file' field"))?;
    if upload.name.is_empty() {
        upload.name = file_name.clone().unwrap_or_default();
    }
    if upload.original_name.is_none() {
        upload.original_name = file_name;
    }
    upload.mime_type = mime_type;
    Ok(upload)
}

/// POST /api/uploads (multipart)
pub async fn upload_direct(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<File>>), ApiError> {
    let upload = read_direct_upload(multipart).await?;
    let file = state.uploads.upload_direct(auth.context(), upload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// POST /api/uploads/presign
pub async fn presign(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(body): ValidatedJson<PresignRequest>,
) -> Result<Json<ApiResponse<PresignedUpload>>, ApiError> {
    let presigned = state
        .uploads
        .presign(&body.file_name, body.file_type.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(ApiResponse::ok(presigned)))
}

/// POST /api/uploads/register
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PendingUpload>,
) -> Result<(StatusCode, Json<ApiResponse<File>>), ApiError> {
    let file = state.uploads.register(auth.context(), body).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// POST /api/uploads/register-batch
pub async fn register_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<RegisterBatchRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    Ok(Json(
        state
            .uploads
            .register_batch(auth.context(), body.files)
            .await?,
    ))
}
