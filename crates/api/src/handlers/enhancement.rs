//! Handlers for image upload, status polling, recent list and cleanup.

use std::path::Path as FsPath;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pixelift_core::enhancement::{EnhancementStatus, EnhancementType, DEFAULT_ENHANCEMENT_TYPE};
use pixelift_core::error::CoreError;
use pixelift_core::naming::stored_file_name;
use pixelift_core::types::DbId;
use pixelift_core::upload::validate_image_upload;
use pixelift_db::models::enhancement::{CreateEnhancement, Enhancement};
use pixelift_worker::queue::EnhancementJob;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Number of records returned by the recent list when no usable limit is given.
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Upper bound on the recent list size.
pub const MAX_RECENT_LIMIT: i64 = 100;

/// Multipart field carrying the image bytes.
const IMAGE_FIELD: &str = "image";

/// Multipart field carrying the enhancement type.
const TYPE_FIELD: &str = "enhancementType";

/// Response for a freshly accepted upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: DbId,
    pub original_path: String,
    pub status: EnhancementStatus,
    pub enhancement_type: EnhancementType,
}

/// Response for the bulk cleanup endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCompletedResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// Query parameters for the recent list.
///
/// `limit` stays a string so a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<String>,
}

/// The uploaded image as read from the multipart body.
struct UploadedImage {
    file_name: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

// ── Upload ───────────────────────────────────────────────────────────

/// POST /api/enhance
///
/// Accepts a multipart body with an `image` file and an optional
/// `enhancementType` (defaults to `upscale` only when the field is absent). Validates everything before
/// touching disk or the store, stores the bytes, creates a `processing`
/// record and hands the job to the worker queue. Never waits for the job.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let max_bytes = state.config.max_upload_bytes;
    let mut image: Option<UploadedImage> = None;
    let mut enhancement_type_raw: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            IMAGE_FIELD if image.is_none() => {
                image = Some(read_image_field(field, max_bytes).await?);
            }
            TYPE_FIELD => {
                enhancement_type_raw = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {} // ignore unknown and repeated fields
        }
    }

    let image =
        image.ok_or_else(|| AppError::BadRequest("No image file provided".to_string()))?;

    let kind = validate_image_upload(
        &image.file_name,
        image.content_type.as_deref(),
        &image.data,
        max_bytes,
    )?;

    let enhancement_type = match enhancement_type_raw.as_deref() {
        None => DEFAULT_ENHANCEMENT_TYPE,
        Some(raw) => raw
            .parse::<EnhancementType>()
            .map_err(|_| AppError::BadRequest("Invalid enhancement type".to_string()))?,
    };

    // Claim queue room first so a busy server rejects before any side effect.
    let slot = state.queue.try_reserve()?;

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

    let stem = uuid::Uuid::new_v4().simple().to_string();
    let stored_path = upload_dir.join(stored_file_name(&stem, kind.extension()));
    tokio::fs::write(&stored_path, &image.data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;
    let original_path = stored_path.to_string_lossy().to_string();

    let input = CreateEnhancement {
        original_filename: image.file_name,
        original_path: original_path.clone(),
        enhancement_type,
        user_id: None,
    };
    let enhancement = match state.store.create_enhancement(&input).await {
        Ok(record) => record,
        Err(e) => {
            discard_upload(&stored_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        enhancement_id = enhancement.id,
        %enhancement_type,
        original_filename = %enhancement.original_filename,
        size_bytes = image.data.len(),
        "Enhancement accepted",
    );

    slot.submit(EnhancementJob {
        enhancement_id: enhancement.id,
        source_path: stored_path,
        enhancement_type,
    });

    Ok(Json(UploadResponse {
        id: enhancement.id,
        original_path,
        status: enhancement.status,
        enhancement_type,
    }))
}

/// Read the image field in chunks, stopping as soon as it exceeds `max_bytes`.
async fn read_image_field(mut field: Field<'_>, max_bytes: usize) -> AppResult<UploadedImage> {
    let file_name = field.file_name().unwrap_or("").to_string();
    let content_type = field.content_type().map(str::to_string);

    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(UploadedImage {
        file_name,
        content_type,
        data,
    })
}

/// Map multipart parsing failures to 400, including body-limit overruns.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BadRequest("File too large".to_string())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::Core(CoreError::Validation(format!(
        "File too large: the limit is {max_bytes} bytes"
    )))
}

async fn discard_upload(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to discard orphaned upload");
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// GET /api/enhance/{id}
///
/// An id that is not an integer cannot name a record, so it is a 404 like
/// any other unknown id.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Enhancement>> {
    let found = match raw_id.parse::<DbId>() {
        Ok(id) => state.store.get_enhancement(id).await?,
        Err(_) => None,
    };
    let enhancement = found.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Enhancement",
        id: raw_id,
    }))?;
    Ok(Json(enhancement))
}

// ── Recent ───────────────────────────────────────────────────────────

/// GET /api/enhancements/recent?limit=N
pub async fn list_recent(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> AppResult<Json<Vec<Enhancement>>> {
    let limit = parse_limit(params.limit.as_deref());
    let items = state.store.list_recent_enhancements(limit).await?;
    Ok(Json(items))
}

/// Resolve the `limit` query value: missing, malformed or non-positive
/// values use [`DEFAULT_RECENT_LIMIT`]; large values are capped.
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.min(MAX_RECENT_LIMIT))
        .unwrap_or(DEFAULT_RECENT_LIMIT)
}

// ── Clear completed ──────────────────────────────────────────────────

/// DELETE /api/enhancements/clear-completed
pub async fn clear_completed(
    State(state): State<AppState>,
) -> AppResult<Json<ClearCompletedResponse>> {
    let deleted_count = state.store.clear_completed_enhancements().await?;
    tracing::info!(deleted_count, "Cleared completed enhancements");

    Ok(Json(ClearCompletedResponse {
        message: format!("Cleared {deleted_count} completed enhancements from storage"),
        deleted_count,
    }))
}
