//! Storage setup

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{create_storage, create_thumbnail_store, Storage, ThumbnailStore};

/// Build the durable object store and the derived-asset store.
pub async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn Storage>, Arc<dyn ThumbnailStore>)> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize object storage")?;
    tracing::info!(backend = %storage.backend_type(), "Object storage initialized");

    let thumbnails = create_thumbnail_store(config)
        .await
        .context("Failed to initialize thumbnail storage")?;
    tracing::info!(backend = %thumbnails.backend_type(), "Thumbnail storage initialized");

    Ok((storage, thumbnails))
}
