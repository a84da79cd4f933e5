use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore};
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Bytes buffered before an upload switches from a single put to multipart.
const UPLOAD_BUFFER_BYTES: usize = 8 * 1024 * 1024;

/// S3 object store
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    buffer_capacity: usize,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    distribution: Option<String>, // CDN host fronting the bucket
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `distribution` - Optional CDN domain; when set, public URLs are `https://{distribution}/{key}`
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        distribution: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store: Arc::new(store),
            buffer_capacity: UPLOAD_BUFFER_BYTES,
            bucket,
            region,
            endpoint_url,
            distribution,
        })
    }

    /// Public URL for an S3 object
    ///
    /// Preference order: CDN distribution, custom endpoint (path-style), AWS virtual-hosted style.
    fn generate_url(&self, key: &str) -> String {
        object_url(
            &self.bucket,
            &self.region,
            self.endpoint_url.as_deref(),
            self.distribution.as_deref(),
            key,
        )
    }
}

fn object_url(
    bucket: &str,
    region: &str,
    endpoint: Option<&str>,
    distribution: Option<&str>,
    key: &str,
) -> String {
    if let Some(distribution) = distribution {
        let host = distribution
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        format!("https://{}/{}", host, key)
    } else if let Some(endpoint) = endpoint {
        format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
    } else {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        // Below the buffer capacity the object is one put on shutdown, above it multipart.
        let mut writer =
            BufWriter::with_capacity(self.store.clone(), location, self.buffer_capacity)
                .with_attributes(attributes);

        // abort is only valid before shutdown has started
        let result = match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(size) => writer.shutdown().await.map(|()| size),
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::warn!(
                        error = %abort_err,
                        key = %storage_key,
                        "Failed to abort S3 upload"
                    );
                }
                Err(e)
            }
        };

        let size = match result {
            Ok(size) => size,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    expected_bytes = ?content_length,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::ObjectStoreExt;

    fn in_memory(buffer_capacity: usize) -> (S3Storage, Arc<InMemory>) {
        let backing = Arc::new(InMemory::new());
        let storage = S3Storage {
            store: backing.clone(),
            buffer_capacity,
            bucket: "tubely-videos".to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            distribution: None,
        };
        (storage, backing)
    }

    #[tokio::test]
    async fn test_upload_stream_sets_content_type() {
        let (storage, backing) = in_memory(UPLOAD_BUFFER_BYTES);
        let data = vec![3u8; 1024];

        let url = storage
            .upload_stream(
                "landscape/abc.mp4",
                "video/mp4",
                Some(1024),
                Box::pin(std::io::Cursor::new(data.clone())),
            )
            .await
            .unwrap();

        assert_eq!(
            url,
            "https://tubely-videos.s3.us-east-1.amazonaws.com/landscape/abc.mp4"
        );
        let object = backing.get(&Path::from("landscape/abc.mp4")).await.unwrap();
        assert_eq!(
            object.attributes.get(&Attribute::ContentType).map(|v| v.as_ref()),
            Some("video/mp4")
        );
        assert_eq!(object.bytes().await.unwrap().as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn test_upload_stream_larger_than_buffer_uses_multipart() {
        // A 4 KiB buffer forces the multipart path.
        let (storage, backing) = in_memory(4 * 1024);
        let data: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();

        storage
            .upload_stream(
                "other/big.mp4",
                "video/mp4",
                Some(data.len() as u64),
                Box::pin(std::io::Cursor::new(data.clone())),
            )
            .await
            .unwrap();

        let object = backing.get(&Path::from("other/big.mp4")).await.unwrap();
        assert_eq!(object.bytes().await.unwrap().as_ref(), data.as_slice());
    }

    #[test]
    fn test_distribution_url_wins() {
        let url = object_url(
            "tubely-videos",
            "us-east-1",
            Some("http://localhost:9000"),
            Some("https://d111111abcdef8.cloudfront.net/"),
            "landscape/abc.mp4",
        );
        assert_eq!(url, "https://d111111abcdef8.cloudfront.net/landscape/abc.mp4");
    }

    #[test]
    fn test_custom_endpoint_is_path_style() {
        let url = object_url(
            "tubely-videos",
            "us-east-1",
            Some("http://localhost:9000/"),
            None,
            "portrait/abc.mp4",
        );
        assert_eq!(url, "http://localhost:9000/tubely-videos/portrait/abc.mp4");
    }

    #[test]
    fn test_aws_virtual_hosted_url() {
        let url = object_url("tubely-videos", "eu-west-1", None, None, "other/abc.mp4");
        assert_eq!(
            url,
            "https://tubely-videos.s3.eu-west-1.amazonaws.com/other/abc.mp4"
        );
    }
}
