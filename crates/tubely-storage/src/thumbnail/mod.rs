//! Derived-asset store for video thumbnails.
//!
//! Two interchangeable backends implement [`ThumbnailStore`]:
//!
//! - [`FilesystemThumbnailStore`] writes each thumbnail under a random filename below
//!   the public asset root. Durable across restarts; superseded files are never removed.
//! - [`MemoryThumbnailStore`] keeps thumbnails in a process-wide map keyed by video id.
//!   **Not durable**: contents are lost when the process exits.

mod filesystem;
mod memory;

pub use filesystem::FilesystemThumbnailStore;
pub use memory::MemoryThumbnailStore;

use crate::traits::StorageResult;
use crate::ThumbnailBackend;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// A stored thumbnail payload together with its declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub data: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Store a thumbnail for `video_id` and return the key it can be read back under.
    async fn put(&self, video_id: Uuid, data: Bytes, content_type: &str) -> StorageResult<String>;

    /// Read a thumbnail back by the key returned from [`ThumbnailStore::put`].
    ///
    /// Returns `StorageError::NotFound` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Thumbnail>;

    /// Public URL of the route serving `key`.
    fn url_for(&self, key: &str) -> String;

    fn backend_type(&self) -> ThumbnailBackend;
}

pub(crate) fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some(".png"),
        "image/jpeg" => Some(".jpeg"),
        _ => None,
    }
}

pub(crate) fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpeg" | "jpg" => Some("image/jpeg"),
        _ => None,
    }
}
