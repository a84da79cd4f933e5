//! Storage abstraction trait
//!
//! This module defines the Storage trait that every durable object store backend implements.

use crate::keys::KeyError;
use crate::StorageBackend;
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Storage key unavailable: {0}")]
    Entropy(#[from] KeyError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable object store abstraction
///
/// A backend writes bytes under a caller-chosen key with a content type and reports the
/// public URL the object is reachable at. Single-key writes rely on the backend's own
/// atomicity; callers never partially observe an object.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload from a stream/reader (for large files such as normalized videos)
    ///
    /// The reader is consumed until EOF.
    ///
    /// # Arguments
    /// * `storage_key` - Key to write the object under
    /// * `content_type` - MIME type attached to the object
    /// * `content_length` - Expected size of the content (may be used for optimization)
    /// * `reader` - Async reader that provides the object content
    ///
    /// # Returns
    /// The public URL of the uploaded object
    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
