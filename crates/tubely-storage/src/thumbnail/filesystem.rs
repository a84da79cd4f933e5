use super::{content_type_for_extension, extension_for_content_type, Thumbnail, ThumbnailStore};
use crate::keys::generate_token;
use crate::traits::{StorageError, StorageResult};
use crate::ThumbnailBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Thumbnails as files named `{token}{ext}` directly under the asset root
#[derive(Clone)]
pub struct FilesystemThumbnailStore {
    assets_root: PathBuf,
    public_base_url: String,
}

impl FilesystemThumbnailStore {
    /// # Arguments
    /// * `assets_root` - Directory served at `/assets`
    /// * `public_base_url` - Externally visible base URL of this service
    pub async fn new(
        assets_root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> StorageResult<Self> {
        let assets_root = assets_root.into();

        fs::create_dir_all(&assets_root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create assets directory {}: {}",
                assets_root.display(),
                e
            ))
        })?;

        Ok(Self {
            assets_root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Keys are bare filenames; anything with a separator or `..` is rejected.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(StorageError::InvalidKey(format!(
                "Invalid thumbnail key: {}",
                key
            )));
        }
        Ok(self.assets_root.join(key))
    }
}

#[async_trait]
impl ThumbnailStore for FilesystemThumbnailStore {
    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    async fn put(&self, video_id: Uuid, data: Bytes, content_type: &str) -> StorageResult<String> {
        let extension = extension_for_content_type(content_type).ok_or_else(|| {
            StorageError::UploadFailed(format!("Unsupported thumbnail type: {}", content_type))
        })?;
        let token = generate_token()?;
        let key = format!("{}{}", token, extension);
        let path = self.key_to_path(&key)?;
        let partial = self.assets_root.join(format!(".{}.partial", key));

        let start = std::time::Instant::now();

        let write = async {
            let mut file = fs::File::create(&partial).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&partial, &path).await
        }
        .await;

        if let Err(e) = write {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to write thumbnail {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail written to asset root"
        );

        Ok(key)
    }

    async fn get(&self, key: &str) -> StorageResult<Thumbnail> {
        let path = self.key_to_path(key)?;
        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for_extension)
            .unwrap_or("application/octet-stream");

        match fs::read(&path).await {
            Ok(data) => Ok(Thumbnail {
                data: Bytes::from(data),
                content_type: content_type.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/assets/{}", self.public_base_url, key)
    }

    fn backend_type(&self) -> ThumbnailBackend {
        ThumbnailBackend::Filesystem
    }
}
