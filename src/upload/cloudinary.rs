//! Cloudinary unsigned uploads.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::{ImageHost, ImageUpload};
use crate::errors::AppError;

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorResponse {
    error: UploadErrorBody,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

/// Uploads through an unsigned upload preset; no API secret is held here.
pub struct CloudinaryHost {
    client: Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryHost {
    pub fn new(cloud_name: &str, upload_preset: impl Into<String>) -> Self {
        Self::with_upload_url(
            format!("{}/{}/image/upload", CLOUDINARY_API_BASE, cloud_name),
            upload_preset,
        )
    }

    /// Point at a different upload endpoint (proxies, regional API hosts).
    pub fn with_upload_url(upload_url: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
        }
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError> {
        let file_name = image
            .file_name
            .clone()
            .unwrap_or_else(|| format!("upload.{}", image.extension()));
        let mut part = Part::bytes(image.bytes).file_name(file_name);
        if let Some(content_type) = image.content_type.as_deref() {
            part = part.mime_str(content_type).map_err(upload_error)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(upload_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<UploadErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("HTTP {}", status),
            };
            tracing::warn!("Cloudinary rejected upload: {}", message);
            return Err(AppError::UploadFailure(format!(
                "Image host rejected the upload: {}",
                message
            )));
        }

        let body: UploadResponse = response.json().await.map_err(upload_error)?;
        tracing::info!(url = %body.secure_url, "Image uploaded to Cloudinary");
        Ok(body.secure_url)
    }
}

fn upload_error(err: reqwest::Error) -> AppError {
    tracing::error!("Image host request failed: {:?}", err);
    AppError::UploadFailure(format!("Image host request failed: {}", err))
}
