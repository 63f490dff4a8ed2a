//! Media upload handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;

use wlink_models::{MediaAsset, MediaId, MediaKind};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::auth::StatusResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MediaUploadResponse {
    pub media: Vec<MediaAsset>,
}

/// Multipart upload endpoint. Fields named `video` and `image` are
/// forwarded to the CDN with the matching transcoding profile; anything
/// else is rejected.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<MediaUploadResponse>> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let kind = match field.name() {
            Some("video") => MediaKind::Video,
            Some("image") => MediaKind::Image,
            Some(other) => {
                return Err(ApiError::bad_request(format!(
                    "Unexpected multipart field '{}', expected 'video' or 'image'",
                    other
                )))
            }
            None => return Err(ApiError::bad_request("Multipart field without a name")),
        };

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("upload.{}", kind.as_str()));
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        let asset = state
            .media_library
            .upload(&user.id, kind, &filename, &content_type, bytes.to_vec())
            .await?;
        uploaded.push(asset);
    }

    if uploaded.is_empty() {
        return Err(ApiError::bad_request("No 'video' or 'image' fields in upload"));
    }

    Ok(Json(MediaUploadResponse { media: uploaded }))
}

/// Delete an owned media asset (CDN first, local record second).
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(media_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    state
        .media_library
        .delete(&user.id, &MediaId::from_string(media_id))
        .await?;
    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
    }))
}
