use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Local filesystem object store
///
/// Objects are written next to their final path under a `.partial` suffix and renamed
/// into place, so a reader never observes a half-written object.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for objects (e.g., "/var/lib/tubely/storage")
    /// * `base_url` - Base URL the directory is served under (e.g., "http://localhost:8091/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Map a storage key onto a path below `base_path`, rejecting traversal.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid characters: {}",
                storage_key
            )));
        }

        let path = self.base_path.join(storage_key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn partial_path(path: &Path) -> PathBuf {
        let mut partial = path.as_os_str().to_owned();
        partial.push(".partial");
        PathBuf::from(partial)
    }

    /// Copy `reader` into `path` via a sibling `.partial` file, then rename into place.
    async fn write_atomically(
        &self,
        path: &Path,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<u64> {
        self.ensure_parent_dir(path).await?;
        let partial = Self::partial_path(path);

        let result = async {
            let mut file = fs::File::create(&partial).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    partial.display(),
                    e
                ))
            })?;

            let bytes_copied = tokio::io::copy(reader, &mut file).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    partial.display(),
                    e
                ))
            })?;

            file.flush().await?;
            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to sync file {}: {}",
                    partial.display(),
                    e
                ))
            })?;

            fs::rename(&partial, path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move {} into place: {}",
                    path.display(),
                    e
                ))
            })?;

            Ok::<u64, StorageError>(bytes_copied)
        }
        .await;

        if result.is_err() {
            let _ = fs::remove_file(&partial).await;
        }
        result
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        let bytes_copied = self.write_atomically(&path, &mut *reader).await?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            content_type = %content_type,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
