//! Image upload endpoint.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::upload::ImageUpload;
use crate::AppState;

/// Name of the multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

/// Hosted location of an uploaded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/upload - Forward an image to the image host and return its URL.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let revision_id = state.store.get_revision_id().await.unwrap_or(0);

    let image = match read_image(multipart).await {
        Ok(image) => image,
        Err(e) => return error(e, revision_id),
    };

    match state.images.upload(image).await {
        Ok(url) => success(UploadResponse { url }, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// Pull the `file` field out of the form, ignoring any other fields.
async fn read_image(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let image = ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        };
        image.validate()?;
        return Ok(image);
    }

    Err(AppError::BadRequest(format!(
        "Multipart field '{}' is required",
        UPLOAD_FIELD
    )))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!("Malformed upload: {}", err);
    let message = format!("Invalid upload body: {}", err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}
