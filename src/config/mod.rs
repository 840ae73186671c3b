//! Configuration module for the tour catalog backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Where uploaded images go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHostConfig {
    /// Unsigned uploads to a Cloudinary cloud
    Cloudinary {
        cloud_name: String,
        upload_preset: String,
    },
    /// Files written to `upload_dir` and served from `/uploads`
    Local,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding admin routes (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Directory for locally hosted images
    pub upload_dir: PathBuf,
    /// Base URL the server is reachable at, used to build local image URLs
    pub public_url: String,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
    pub image_host: ImageHostConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("TOURS_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("TOURS_DB_PATH")
            .unwrap_or_else(|_| "./data/tours.sqlite".to_string())
            .into();

        let bind_addr: SocketAddr = env::var("TOURS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid TOURS_BIND_ADDR format");

        let log_level = env::var("TOURS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let upload_dir = env::var("TOURS_UPLOAD_DIR")
            .unwrap_or_else(|_| "./data/uploads".to_string())
            .into();

        let public_url =
            env::var("TOURS_PUBLIC_URL").unwrap_or_else(|_| format!("http://{}", bind_addr));

        let max_upload_bytes = env::var("TOURS_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10 * 1024 * 1024);

        let image_host = match (
            env::var("CLOUDINARY_CLOUD_NAME"),
            env::var("CLOUDINARY_UPLOAD_PRESET"),
        ) {
            (Ok(cloud_name), Ok(upload_preset))
                if !cloud_name.is_empty() && !upload_preset.is_empty() =>
            {
                ImageHostConfig::Cloudinary {
                    cloud_name,
                    upload_preset,
                }
            }
            _ => ImageHostConfig::Local,
        };

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            upload_dir,
            public_url,
            max_upload_bytes,
            image_host,
        }
    }
}
