use super::{Thumbnail, ThumbnailStore};
use crate::traits::{StorageError, StorageResult};
use crate::ThumbnailBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-wide thumbnail map keyed by video id
///
/// Every access goes through a single `RwLock`; each `put` replaces the whole entry,
/// so a reader sees exactly one written payload. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryThumbnailStore {
    entries: Arc<RwLock<HashMap<Uuid, Thumbnail>>>,
    public_base_url: String,
}

impl MemoryThumbnailStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ThumbnailStore for MemoryThumbnailStore {
    async fn put(&self, video_id: Uuid, data: Bytes, content_type: &str) -> StorageResult<String> {
        let size = data.len();
        let thumbnail = Thumbnail {
            data,
            content_type: content_type.to_string(),
        };

        self.entries.write().await.insert(video_id, thumbnail);

        tracing::debug!(
            video_id = %video_id,
            size_bytes = size,
            "Thumbnail stored in memory"
        );

        Ok(video_id.to_string())
    }

    async fn get(&self, key: &str) -> StorageResult<Thumbnail> {
        let video_id = Uuid::parse_str(key)
            .map_err(|_| StorageError::InvalidKey(format!("Invalid thumbnail key: {}", key)))?;

        self.entries
            .read()
            .await
            .get(&video_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/api/thumbnails/{}", self.public_base_url, key)
    }

    fn backend_type(&self) -> ThumbnailBackend {
        ThumbnailBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_by_video_id() {
        let store = MemoryThumbnailStore::new("http://localhost:8091");
        let video_id = Uuid::new_v4();

        let key = store
            .put(video_id, Bytes::from_static(b"jpeg bytes"), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(key, video_id.to_string());
        assert_eq!(
            store.url_for(&key),
            format!("http://localhost:8091/api/thumbnails/{}", video_id)
        );

        let thumbnail = store.get(&key).await.unwrap();
        assert_eq!(thumbnail.content_type, "image/jpeg");
        assert_eq!(&thumbnail.data[..], b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_missing_is_not_found() {
        let store = MemoryThumbnailStore::new("http://localhost:8091");
        let result = store.get(&Uuid::new_v4().to_string()).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(matches!(
            store.get("not-a-uuid").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_keep_one_payload() {
        let store = MemoryThumbnailStore::new("http://localhost:8091");
        let video_id = Uuid::new_v4();
        let payload_a = Bytes::from(vec![b'a'; 64 * 1024]);
        let payload_b = Bytes::from(vec![b'b'; 64 * 1024]);

        for _ in 0..50 {
            let (a, b) = {
                let store_a = store.clone();
                let store_b = store.clone();
                let data_a = payload_a.clone();
                let data_b = payload_b.clone();
                tokio::join!(
                    tokio::spawn(async move { store_a.put(video_id, data_a, "image/png").await }),
                    tokio::spawn(async move { store_b.put(video_id, data_b, "image/jpeg").await }),
                )
            };
            a.unwrap().unwrap();
            b.unwrap().unwrap();

            let stored = store.get(&video_id.to_string()).await.unwrap();
            let is_a = stored.data == payload_a && stored.content_type == "image/png";
            let is_b = stored.data == payload_b && stored.content_type == "image/jpeg";
            assert!(is_a || is_b);
        }

        assert_eq!(store.entries.read().await.len(), 1);
    }
}
