//! Configuration module
//!
//! Configuration is read once at startup from the environment (a `.env` file is
//! honoured through dotenvy) and validated before any service is built.

use std::env;
use std::path::PathBuf;

use crate::storage_types::{StorageBackend, ThumbnailBackend};

const SERVER_PORT: u16 = 8091;
const DB_MAX_CONNECTIONS: u32 = 10;
const MAX_VIDEO_SIZE_MB: u64 = 10 * 1024;
const MAX_THUMBNAIL_SIZE_MB: u64 = 10;
const MIN_JWT_SECRET_LEN: usize = 32;

/// HTTP server and auth settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub public_base_url: String,
    pub cors_origins: Vec<String>,
}

/// Settings for the media ingestion pipeline and its collaborators
#[derive(Clone, Debug)]
pub struct PublisherConfig {
    pub base: BaseConfig,
    // Metadata store
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    // Durable object store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub s3_distribution: Option<String>,
    pub local_storage_path: PathBuf,
    pub local_storage_base_url: String,
    // Derived-asset store
    pub thumbnail_backend: ThumbnailBackend,
    pub assets_root: PathBuf,
    // Staging and external tools
    pub staging_dir: Option<PathBuf>,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PublisherConfig>);

impl Config {
    fn as_publisher(&self) -> &PublisherConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_publisher().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PublisherConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_publisher().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_publisher().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_publisher().base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_publisher().base.jwt_secret
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_publisher().base.public_base_url
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_publisher().base.cors_origins
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_publisher().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_publisher().db_max_connections
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_publisher().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_publisher().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_publisher().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_publisher().s3_endpoint.as_deref()
    }

    pub fn s3_distribution(&self) -> Option<&str> {
        self.as_publisher().s3_distribution.as_deref()
    }

    pub fn local_storage_path(&self) -> &PathBuf {
        &self.as_publisher().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.as_publisher().local_storage_base_url
    }

    pub fn thumbnail_backend(&self) -> ThumbnailBackend {
        self.as_publisher().thumbnail_backend
    }

    pub fn assets_root(&self) -> &PathBuf {
        &self.as_publisher().assets_root
    }

    pub fn staging_dir(&self) -> Option<&PathBuf> {
        self.as_publisher().staging_dir.as_ref()
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.as_publisher().max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> u64 {
        self.as_publisher().max_thumbnail_size_bytes
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_publisher().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_publisher().ffmpeg_path
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Convert a megabyte setting to bytes, rejecting values that do not fit in a `u64`.
fn megabytes_to_bytes(name: &str, megabytes: u64) -> Result<u64, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {} MB", name, megabytes))
}

fn size_ceiling_from_env(name: &str, default_mb: u64) -> Result<u64, anyhow::Error> {
    let megabytes = env::var(name)
        .unwrap_or_else(|_| default_mb.to_string())
        .parse::<u64>()
        .unwrap_or(default_mb);
    megabytes_to_bytes(name, megabytes)
}

impl PublisherConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .unwrap_or(SERVER_PORT);

        let public_base_url = non_empty_var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        let base = BaseConfig {
            server_port,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            public_base_url: public_base_url.clone(),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        let config = PublisherConfig {
            base,
            database_url: non_empty_var("DATABASE_URL"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DB_MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(DB_MAX_CONNECTIONS),
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "s3".to_string())
                .parse()?,
            s3_bucket: non_empty_var("S3_BUCKET"),
            s3_region: non_empty_var("S3_REGION").or_else(|| non_empty_var("AWS_REGION")),
            s3_endpoint: non_empty_var("S3_ENDPOINT"),
            s3_distribution: non_empty_var("S3_CF_DISTRO"),
            local_storage_path: non_empty_var("LOCAL_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./storage")),
            local_storage_base_url: non_empty_var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| format!("{}/media", public_base_url)),
            thumbnail_backend: env::var("THUMBNAIL_BACKEND")
                .unwrap_or_else(|_| "filesystem".to_string())
                .parse()?,
            assets_root: non_empty_var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./assets")),
            staging_dir: non_empty_var("STAGING_DIR").map(PathBuf::from),
            max_video_size_bytes: size_ceiling_from_env("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?,
            max_thumbnail_size_bytes: size_ceiling_from_env(
                "MAX_THUMBNAIL_SIZE_MB",
                MAX_THUMBNAIL_SIZE_MB,
            )?,
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if let Some(ref url) = self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.storage_backend == StorageBackend::S3
            && (self.s3_bucket.is_none() || self.s3_region.is_none())
        {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=s3 requires S3_BUCKET and S3_REGION (or AWS_REGION)"
            ));
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_VIDEO_SIZE_MB and MAX_THUMBNAIL_SIZE_MB must be greater than zero"
            ));
        }

        if self.ffprobe_path.trim().is_empty() || self.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFPROBE_PATH and FFMPEG_PATH must not be empty"));
        }

        Ok(())
    }
}
