#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{
    FilesystemThumbnailStore, MemoryThumbnailStore, Storage, StorageBackend, StorageError,
    StorageResult, ThumbnailBackend, ThumbnailStore,
};
use std::sync::Arc;
use tubely_core::Config;

/// Create the durable object store selected by `STORAGE_BACKEND`
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint().map(String::from);
            let distribution = config.s3_distribution().map(String::from);

            let storage = S3Storage::new(bucket, region, endpoint, distribution).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local_storage_path().clone(),
                config.local_storage_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// Create the derived-asset store selected by `THUMBNAIL_BACKEND`
pub async fn create_thumbnail_store(config: &Config) -> StorageResult<Arc<dyn ThumbnailStore>> {
    match config.thumbnail_backend() {
        ThumbnailBackend::Filesystem => {
            let store =
                FilesystemThumbnailStore::new(config.assets_root().clone(), config.public_base_url())
                    .await?;
            Ok(Arc::new(store))
        }
        ThumbnailBackend::Memory => {
            tracing::warn!("Using in-memory thumbnail store; thumbnails are lost on restart");
            Ok(Arc::new(MemoryThumbnailStore::new(config.public_base_url())))
        }
    }
}
