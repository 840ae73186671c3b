//! Catalog client used by the admin and landing pages.
//!
//! [`CatalogApi`] is the seam the admin session is written against;
//! [`HttpCatalogClient`] implements it over the REST API.

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::{UploadResponse, UPLOAD_FIELD};
use crate::auth::API_KEY_HEADER;
use crate::errors::{AppError, ErrorResponse};
use crate::models::{Package, PackageRequest, PackageType};
use crate::upload::ImageUpload;

/// Operations the admin page needs from the catalog backend.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_packages(&self, filter: Option<PackageType>) -> Result<Vec<Package>, AppError>;

    async fn create_package(&self, request: &PackageRequest) -> Result<Package, AppError>;

    async fn replace_package(
        &self,
        city: &str,
        request: &PackageRequest,
    ) -> Result<Package, AppError>;

    async fn delete_package(&self, city: &str) -> Result<(), AppError>;

    async fn upload_image(&self, image: ImageUpload) -> Result<String, AppError>;

    /// Packages shown on the public landing page.
    async fn domestic_packages(&self) -> Result<Vec<Package>, AppError> {
        self.list_packages(Some(PackageType::Domestic)).await
    }

    async fn all_packages(&self) -> Result<Vec<Package>, AppError> {
        self.list_packages(None).await
    }
}

#[derive(Debug, Deserialize)]
struct SuccessEnvelope<T> {
    data: T,
}

/// REST client for the catalog API.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCatalogClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Send the admin key on every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn package_url(&self, city: &str) -> Result<reqwest::Url, AppError> {
        let mut url = reqwest::Url::parse(&self.url("/packages"))
            .map_err(|e| AppError::Internal(format!("Invalid catalog URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Catalog URL cannot carry a path".to_string()))?
            .push(city);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let request = match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        };

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();

        if status.is_success() {
            let envelope: SuccessEnvelope<T> = response.json().await.map_err(network_error)?;
            return Ok(envelope.data);
        }

        match response.json::<ErrorResponse>().await {
            Ok(body) => Err(AppError::from_code(&body.error.code, body.error.message)),
            Err(_) => Err(AppError::StorageUnavailable(format!(
                "Catalog request failed with HTTP {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list_packages(&self, filter: Option<PackageType>) -> Result<Vec<Package>, AppError> {
        let mut request = self.client.get(self.url("/packages"));
        if let Some(package_type) = filter {
            request = request.query(&[("type", package_type.as_str())]);
        }
        self.send(request).await
    }

    async fn create_package(&self, request: &PackageRequest) -> Result<Package, AppError> {
        self.send(self.client.post(self.url("/packages")).json(request))
            .await
    }

    async fn replace_package(
        &self,
        city: &str,
        request: &PackageRequest,
    ) -> Result<Package, AppError> {
        let url = self.package_url(city)?;
        self.send(self.client.put(url).json(request)).await
    }

    async fn delete_package(&self, city: &str) -> Result<(), AppError> {
        let url = self.package_url(city)?;
        self.send::<()>(self.client.delete(url)).await
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<String, AppError> {
        let file_name = image
            .file_name
            .clone()
            .unwrap_or_else(|| format!("upload.{}", image.extension()));
        let mut part = multipart::Part::bytes(image.bytes).file_name(file_name);
        if let Some(content_type) = image.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::UploadFailure(format!("Invalid content type: {}", e)))?;
        }
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let response: UploadResponse = self
            .send(self.client.post(self.url("/upload")).multipart(form))
            .await?;
        Ok(response.url)
    }
}

fn network_error(err: reqwest::Error) -> AppError {
    tracing::error!("Catalog request failed: {:?}", err);
    AppError::StorageUnavailable(format!("Catalog request failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_url_escapes_city() {
        let client = HttpCatalogClient::new("http://localhost:8080/");

        let url = client.package_url("New Delhi/NCR").unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/packages/New%20Delhi%2FNCR"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_storage_unavailable() {
        // Port 9 (discard) is never served in test environments.
        let client = HttpCatalogClient::new("http://127.0.0.1:9");

        let err = client.all_packages().await.unwrap_err();

        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }
}
