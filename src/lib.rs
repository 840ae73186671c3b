//! Tour Catalog
//!
//! REST backend for the tour package catalog with SQLite persistence, plus the
//! client-side draft and admin session used by the admin page.

pub mod admin;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod draft;
pub mod errors;
pub mod models;
pub mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use catalog::{CatalogAdmin, CatalogQuery};
use config::{Config, ImageHostConfig};
use db::PackageStore;
use upload::{CloudinaryHost, ImageHost, LocalImageHost};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PackageStore>,
    pub query: CatalogQuery,
    pub admin: CatalogAdmin,
    pub images: Arc<dyn ImageHost>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<PackageStore>, images: Arc<dyn ImageHost>, config: Config) -> Self {
        Self {
            query: CatalogQuery::new(store.clone()),
            admin: CatalogAdmin::new(store.clone()),
            store,
            images,
            config: Arc::new(config),
        }
    }
}

/// Build the image host selected by configuration.
pub fn image_host_from_config(config: &Config) -> Arc<dyn ImageHost> {
    match &config.image_host {
        ImageHostConfig::Cloudinary {
            cloud_name,
            upload_preset,
        } => Arc::new(CloudinaryHost::new(cloud_name, upload_preset.clone())),
        ImageHostConfig::Local => Arc::new(LocalImageHost::new(
            config.upload_dir.clone(),
            config.public_url.clone(),
        )),
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();
    let max_upload_bytes = state.config.max_upload_bytes;

    // Reads used by the landing page and admin listing
    let public_routes = Router::new()
        .route("/packages", get(api::list_packages))
        .route("/packages/{city}", get(api::get_package))
        .route("/catalog/revision", get(api::get_revision));

    // Catalog mutations and uploads
    let admin_routes = Router::new()
        .route("/packages", post(api::create_package))
        .route(
            "/packages/{city}",
            put(api::replace_package).delete(api::delete_package),
        )
        .route(
            "/upload",
            post(api::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(psk.clone(), req, next)
        }));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
