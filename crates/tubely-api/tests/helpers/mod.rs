//! Test helpers: build AppState and router for integration tests.
//!
//! The app runs on the in-memory metadata store and local storage in a temp dir.
//! ffprobe and ffmpeg are replaced by fakes, so no external tools are needed.

#![allow(dead_code)]

pub mod auth;

use async_trait::async_trait;
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::config::{BaseConfig, PublisherConfig};
use tubely_core::models::VideoRecord;
use tubely_core::{Config, StorageBackend, ThumbnailBackend};
use tubely_db::InMemoryVideoRepository;
use tubely_processing::normalize::normalized_path;
use tubely_processing::{
    AssetPublisher, AssetPublisherConfig, MediaNormalizer, MediaProber, ProbeResult,
    ProcessingError, StagedPath,
};
use tubely_storage::{
    FilesystemThumbnailStore, LocalStorage, MemoryThumbnailStore, Storage, ThumbnailStore,
};
use uuid::Uuid;

pub const PUBLIC_BASE_URL: &str = "http://localhost:8091";

/// Reports a fixed display aspect ratio.
struct FixedRatioProber(Option<&'static str>);

#[async_trait]
impl MediaProber for FixedRatioProber {
    async fn probe(&self, _path: &Path) -> Result<ProbeResult, ProcessingError> {
        Ok(ProbeResult {
            display_aspect_ratio: self.0.map(String::from),
        })
    }
}

/// Copies the staged file to its normalized sibling.
struct CopyNormalizer;

#[async_trait]
impl MediaNormalizer for CopyNormalizer {
    async fn normalize(&self, input: &Path) -> Result<StagedPath, ProcessingError> {
        let output = StagedPath::new(normalized_path(input));
        tokio::fs::copy(input, output.path())
            .await
            .map_err(|e| ProcessingError::NormalizeFailed(e.to_string()))?;
        Ok(output)
    }
}

pub struct TestOptions {
    pub aspect_ratio: Option<&'static str>,
    pub thumbnail_backend: ThumbnailBackend,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            aspect_ratio: Some("16:9"),
            thumbnail_backend: ThumbnailBackend::Memory,
            max_video_size_bytes: 1024 * 1024,
            max_thumbnail_size_bytes: 1024 * 1024,
        }
    }
}

/// Test application: server plus handles on its stores.
pub struct TestApp {
    pub server: TestServer,
    pub videos: InMemoryVideoRepository,
    pub storage_root: PathBuf,
    pub assets_root: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a fresh record owned by `owner` and return its id.
    pub async fn create_video(&self, owner: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.videos
            .insert(VideoRecord::new(id, owner, "Boots: an overview"))
            .await;
        id
    }

    pub async fn video(&self, id: Uuid) -> VideoRecord {
        use tubely_db::VideoRepository;
        self.videos
            .get_video(id)
            .await
            .expect("metadata lookup failed")
            .expect("video missing")
    }
}

fn test_config(temp_dir: &Path, options: &TestOptions) -> Config {
    let config = PublisherConfig {
        base: BaseConfig {
            server_port: 8091,
            environment: "test".to_string(),
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
            cors_origins: vec!["*".to_string()],
        },
        database_url: None,
        db_max_connections: 1,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        s3_distribution: None,
        local_storage_path: temp_dir.join("storage"),
        local_storage_base_url: format!("{}/media", PUBLIC_BASE_URL),
        thumbnail_backend: options.thumbnail_backend,
        assets_root: temp_dir.join("assets"),
        staging_dir: Some(temp_dir.join("staging")),
        max_video_size_bytes: options.max_video_size_bytes,
        max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
    };
    Config(Box::new(config))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path(), &options);

    let staging_dir = temp_dir.path().join("staging");
    std::fs::create_dir_all(&staging_dir).expect("Failed to create staging dir");

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(
            config.local_storage_path().clone(),
            config.local_storage_base_url().to_string(),
        )
        .await
        .expect("Failed to create local storage"),
    );

    let thumbnails: Arc<dyn ThumbnailStore> = match options.thumbnail_backend {
        ThumbnailBackend::Memory => Arc::new(MemoryThumbnailStore::new(PUBLIC_BASE_URL)),
        ThumbnailBackend::Filesystem => Arc::new(
            FilesystemThumbnailStore::new(config.assets_root().clone(), PUBLIC_BASE_URL)
                .await
                .expect("Failed to create assets dir"),
        ),
    };

    let videos = InMemoryVideoRepository::new();
    let publisher = AssetPublisher::new(
        Arc::new(videos.clone()),
        storage,
        thumbnails,
        Arc::new(FixedRatioProber(options.aspect_ratio)),
        Arc::new(CopyNormalizer),
        AssetPublisherConfig {
            staging_dir,
            max_video_size_bytes: options.max_video_size_bytes,
            max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
        },
    );

    let state = Arc::new(AppState::new(config.clone(), publisher));
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        videos,
        storage_root: config.local_storage_path().clone(),
        assets_root: config.assets_root().clone(),
        _temp_dir: temp_dir,
    }
}

/// A few bytes that start like a PNG file.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

/// A few bytes that start like an MP4 file.
pub fn mp4_bytes() -> Vec<u8> {
    let mut bytes = vec![0, 0, 0, 0x18];
    bytes.extend_from_slice(b"ftypmp42");
    bytes.extend_from_slice(&[0u8; 128]);
    bytes
}
