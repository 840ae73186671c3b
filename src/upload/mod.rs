//! Image hosting.
//!
//! The catalog never stores image bytes: an [`ImageHost`] takes the upload and
//! hands back a URL, and only that URL ends up on the package.

mod cloudinary;
mod local;

pub use cloudinary::*;
pub use local::*;

use async_trait::async_trait;

use crate::errors::AppError;

/// An image received from the admin page.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reject empty bodies and anything not declared as an image.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        match self.content_type.as_deref() {
            Some(ct) if ct.starts_with("image/") => Ok(()),
            Some(ct) => Err(AppError::BadRequest(format!(
                "Expected an image upload, got '{}'",
                ct
            ))),
            None => Err(AppError::BadRequest(
                "Upload is missing a content type".to_string(),
            )),
        }
    }

    /// File extension for the stored copy, from the content type first and
    /// the original file name second.
    pub fn extension(&self) -> String {
        let from_type = match self.content_type.as_deref() {
            Some("image/jpeg") => Some("jpg"),
            Some("image/png") => Some("png"),
            Some("image/gif") => Some("gif"),
            Some("image/webp") => Some("webp"),
            Some("image/svg+xml") => Some("svg"),
            Some("image/avif") => Some("avif"),
            _ => None,
        };
        if let Some(ext) = from_type {
            return ext.to_string();
        }

        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Third-party media host. Returns a stable URL for the uploaded image.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError>;
}
