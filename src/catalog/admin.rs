//! Create, replace and delete operations on the catalog.
//!
//! Two validation layers apply to every submission: the store's schema
//! checks (city, type, timeline numbering) and the stricter admin
//! submission policy below, which also requires an image.

use std::sync::Arc;

use crate::db::PackageStore;
use crate::errors::AppError;
use crate::models::{Package, PackageRequest};

/// Admin submission policy, checked before anything reaches the store.
///
/// Shared with the client draft so the admin page rejects the same drafts
/// the server would, without a round trip.
pub fn check_submission(request: &PackageRequest) -> Result<(), AppError> {
    if request.city.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter the city name.".to_string(),
        ));
    }
    if request.package_type.trim().is_empty() {
        return Err(AppError::Validation(
            "Please select package type (Domestic or International).".to_string(),
        ));
    }
    let has_img = request
        .img
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty());
    if !has_img {
        return Err(AppError::Validation(
            "Please upload an image for this package.".to_string(),
        ));
    }
    Ok(())
}

/// Catalog writes.
#[derive(Clone)]
pub struct CatalogAdmin {
    store: Arc<PackageStore>,
}

impl CatalogAdmin {
    pub fn new(store: Arc<PackageStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new package.
    pub async fn create(&self, request: PackageRequest) -> Result<Package, AppError> {
        check_submission(&request)?;
        let package = request.into_package()?;
        self.store.create(&package).await
    }

    /// Validate and replace the package currently stored under `city`.
    pub async fn replace(&self, city: &str, request: PackageRequest) -> Result<Package, AppError> {
        check_submission(&request)?;
        let package = request.into_package()?;
        self.store.replace(city, &package).await
    }

    /// Delete by city. Deleting an unknown city succeeds.
    pub async fn delete(&self, city: &str) -> Result<(), AppError> {
        self.store.delete_by_city(city).await?;
        Ok(())
    }
}
