//! Package API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, error, success, ApiResult};
use crate::models::{Package, PackageQuery, PackageRequest, PackageType};
use crate::AppState;

/// GET /api/packages - List packages, optionally filtered by `?type=`.
pub async fn list_packages(
    State(state): State<AppState>,
    Query(params): Query<PackageQuery>,
) -> ApiResult<Vec<Package>> {
    let revision_id = state.store.get_revision_id().await.unwrap_or(0);

    let filter = match params.filter() {
        Ok(filter) => filter,
        Err(e) => return error(e, revision_id),
    };

    let packages = match filter {
        None => state.query.all_packages().await,
        Some(PackageType::Domestic) => state.query.domestic_packages().await,
        Some(other) => state.query.packages(Some(other)).await,
    };

    match packages {
        Ok(packages) => success(packages, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/packages/:city - Get a single package.
pub async fn get_package(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> ApiResult<Package> {
    let revision_id = state.store.get_revision_id().await.unwrap_or(0);

    match state.query.package(&city).await {
        Ok(package) => success(package, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/packages - Create a new package.
pub async fn create_package(
    State(state): State<AppState>,
    Json(request): Json<PackageRequest>,
) -> ApiResult<Package> {
    let revision_id = state.store.get_revision_id().await.unwrap_or(0);

    match state.admin.create(request).await {
        Ok(package) => {
            let new_revision = state.store.get_revision_id().await.unwrap_or(revision_id);
            created(package, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/packages/:city - Replace a package document.
pub async fn replace_package(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Json(request): Json<PackageRequest>,
) -> ApiResult<Package> {
    let revision_id = state.store.get_revision_id().await.unwrap_or(0);

    match state.admin.replace(&city, request).await {
        Ok(package) => {
            let new_revision = state.store.get_revision_id().await.unwrap_or(revision_id);
            success(package, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/packages/:city - Delete a package; unknown cities succeed too.
pub async fn delete_package(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.store.get_revision_id().await.unwrap_or(0);

    match state.admin.delete(&city).await {
        Ok(()) => {
            let new_revision = state.store.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
