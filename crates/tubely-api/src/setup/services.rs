//! Publisher wiring

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{AssetPublisher, AssetPublisherConfig, FfmpegNormalizer, FfprobeProber};
use tubely_storage::{Storage, ThumbnailStore};

pub fn initialize_services(
    config: &Config,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    thumbnails: Arc<dyn ThumbnailStore>,
) -> Result<Arc<AppState>> {
    let prober = FfprobeProber::new(config.ffprobe_path()).context("Invalid FFPROBE_PATH")?;
    let normalizer = FfmpegNormalizer::new(config.ffmpeg_path()).context("Invalid FFMPEG_PATH")?;

    let staging_dir = config
        .staging_dir()
        .cloned()
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&staging_dir).with_context(|| {
        format!("Failed to create staging directory {}", staging_dir.display())
    })?;

    tracing::info!(
        staging_dir = %staging_dir.display(),
        max_video_mb = config.max_video_size_bytes() / 1024 / 1024,
        max_thumbnail_mb = config.max_thumbnail_size_bytes() / 1024 / 1024,
        ffprobe_path = %config.ffprobe_path(),
        ffmpeg_path = %config.ffmpeg_path(),
        "Asset publisher configured"
    );

    let publisher = AssetPublisher::new(
        videos,
        storage,
        thumbnails,
        Arc::new(prober),
        Arc::new(normalizer),
        AssetPublisherConfig {
            staging_dir,
            max_video_size_bytes: config.max_video_size_bytes(),
            max_thumbnail_size_bytes: config.max_thumbnail_size_bytes(),
        },
    );

    Ok(Arc::new(AppState::new(config.clone(), publisher)))
}
