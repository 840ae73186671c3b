//! Tour Catalog Backend
//!
//! Serves the package catalog API with SQLite persistence.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tour_catalog::config::{Config, ImageHostConfig};
use tour_catalog::db::{self, PackageStore};
use tour_catalog::{create_router, image_host_from_config, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tour Catalog Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (TOURS_API_PSK). Admin routes are unprotected!");
    }

    match &config.image_host {
        ImageHostConfig::Cloudinary { cloud_name, .. } => {
            tracing::info!("Image host: Cloudinary ({})", cloud_name)
        }
        ImageHostConfig::Local => {
            tracing::info!("Image host: local directory {:?}", config.upload_dir)
        }
    }

    let pool = db::init_database(&config.db_path).await?;
    let store = Arc::new(PackageStore::new(pool));

    let packages = store.list(None).await?;
    tracing::info!("Catalog loaded with {} packages", packages.len());

    let images = image_host_from_config(&config);
    let bind_addr = config.bind_addr;
    let state = AppState::new(store, images, config);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
