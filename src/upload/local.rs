//! Disk-backed image host for development and self-hosted deployments.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{ImageHost, ImageUpload};
use crate::errors::AppError;

/// Writes uploads under a directory served at `/uploads`.
pub struct LocalImageHost {
    dir: PathBuf,
    public_url: String,
}

impl LocalImageHost {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageHost for LocalImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError> {
        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), image.extension());

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            tracing::error!("Failed to create upload directory {:?}: {}", self.dir, e);
            AppError::UploadFailure(format!("Failed to prepare upload directory: {}", e))
        })?;

        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &image.bytes).await.map_err(|e| {
            tracing::error!("Failed to write upload {:?}: {}", path, e);
            AppError::UploadFailure(format!("Failed to store image: {}", e))
        })?;

        tracing::info!(file = %file_name, bytes = image.bytes.len(), "Image stored locally");
        Ok(format!("{}/uploads/{}", self.public_url, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let temp_dir = TempDir::new().unwrap();
        let host = LocalImageHost::new(temp_dir.path().join("uploads"), "http://localhost:8080/");

        let url = host
            .upload(ImageUpload {
                file_name: Some("beach.png".to_string()),
                content_type: Some("image/png".to_string()),
                bytes: b"\x89PNG".to_vec(),
            })
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:8080/uploads/"));
        assert!(url.ends_with(".png"));

        let file_name = url.rsplit('/').next().unwrap();
        let stored = std::fs::read(temp_dir.path().join("uploads").join(file_name)).unwrap();
        assert_eq!(stored, b"\x89PNG");
    }
}
