//! Read-only access to the catalog for the landing page and admin listing.

use std::sync::Arc;

use crate::db::PackageStore;
use crate::errors::AppError;
use crate::models::{Package, PackageType};

/// Catalog reads. Ordering is insertion order and stable between writes.
#[derive(Clone)]
pub struct CatalogQuery {
    store: Arc<PackageStore>,
}

impl CatalogQuery {
    pub fn new(store: Arc<PackageStore>) -> Self {
        Self { store }
    }

    /// Packages shown on the public landing page.
    pub async fn domestic_packages(&self) -> Result<Vec<Package>, AppError> {
        self.store.list(Some(PackageType::Domestic)).await
    }

    /// Every package, for the admin listing.
    pub async fn all_packages(&self) -> Result<Vec<Package>, AppError> {
        self.store.list(None).await
    }

    pub async fn packages(&self, filter: Option<PackageType>) -> Result<Vec<Package>, AppError> {
        self.store.list(filter).await
    }

    pub async fn package(&self, city: &str) -> Result<Package, AppError> {
        self.store
            .get_by_city(city)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Package {} not found", city)))
    }
}
