//! Application state shared by all handlers.

use std::sync::Arc;
use tubely_core::Config;
use tubely_processing::AssetPublisher;
use tubely_storage::ThumbnailStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub publisher: AssetPublisher,
}

impl AppState {
    pub fn new(config: Config, publisher: AssetPublisher) -> Self {
        Self { config, publisher }
    }

    /// HS256 secret for bearer tokens
    pub fn jwt_secret(&self) -> &str {
        self.config.jwt_secret()
    }

    pub fn thumbnails(&self) -> &Arc<dyn ThumbnailStore> {
        self.publisher.thumbnails()
    }
}
