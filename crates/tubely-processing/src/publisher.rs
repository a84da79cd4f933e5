//! Asset publishing: authorize → stage → probe → classify → normalize → key → publish → reconcile.
//!
//! Every step fails fast. The video record is written only after the asset has been
//! durably stored, so a failed publish never leaves a dangling URL behind. A failed
//! record update after a successful write leaves the stored object in place.
//!
//! The record is read and rewritten without a version check: two publishes racing on
//! the same video both succeed and the last reconciliation wins.

use crate::classify::OrientationClass;
use crate::error::ProcessingError;
use crate::normalize::MediaNormalizer;
use crate::probe::MediaProber;
use crate::staging::{stage, StagingError};
use crate::validator::{MediaValidator, ValidationError};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tubely_core::{models::VideoRecord, AppError};
use tubely_db::VideoRepository;
use tubely_storage::{generate_storage_key, KeyError, Storage, StorageError, ThumbnailStore};
use uuid::Uuid;

/// Pipeline position, reported with every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Authorizing,
    Staging,
    Probing,
    Classifying,
    Normalizing,
    Publishing,
    Reconciling,
    Done,
}

impl PublishStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStage::Authorizing => "authorizing",
            PublishStage::Staging => "staging",
            PublishStage::Probing => "probing",
            PublishStage::Classifying => "classifying",
            PublishStage::Normalizing => "normalizing",
            PublishStage::Publishing => "publishing",
            PublishStage::Reconciling => "reconciling",
            PublishStage::Done => "done",
        }
    }
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure classes: the first two are client errors, the last two server errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authorization,
    ToolExecution,
    Storage,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Video {0} not found")]
    RecordNotFound(Uuid),

    #[error("Failed to look up video: {0}")]
    MetadataLookupFailed(String),

    #[error("User {principal} is not authorized to edit video {video_id}")]
    NotAuthorized { video_id: Uuid, principal: Uuid },

    #[error("Missing Content-Type")]
    ContentTypeMissing,

    #[error("Unsupported content type: {0}")]
    ContentTypeUnsupported(String),

    #[error("Upload exceeds the {max_bytes} byte limit")]
    PayloadTooLarge { max_bytes: u64 },

    #[error("Upload interrupted: {message}")]
    UploadInterrupted { too_large: bool, message: String },

    #[error("Failed to stage upload: {0}")]
    StagingIo(#[source] std::io::Error),

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Probe reported no streams")]
    NoStreamsFound,

    #[error("Normalize failed: {0}")]
    NormalizeFailed(String),

    #[error("Secure entropy unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Failed to publish asset: {0}")]
    PublishFailed(#[source] StorageError),

    #[error("Failed to update video record: {0}")]
    MetadataUpdateFailed(String),
}

impl PublishError {
    /// Stage in which this error is raised
    pub fn stage(&self) -> PublishStage {
        match self {
            PublishError::RecordNotFound(_)
            | PublishError::MetadataLookupFailed(_)
            | PublishError::NotAuthorized { .. } => PublishStage::Authorizing,
            PublishError::ContentTypeMissing
            | PublishError::ContentTypeUnsupported(_)
            | PublishError::PayloadTooLarge { .. }
            | PublishError::UploadInterrupted { .. }
            | PublishError::StagingIo(_) => PublishStage::Staging,
            PublishError::ProbeFailed(_) | PublishError::NoStreamsFound => PublishStage::Probing,
            PublishError::NormalizeFailed(_) => PublishStage::Normalizing,
            PublishError::EntropyUnavailable(_) | PublishError::PublishFailed(_) => {
                PublishStage::Publishing
            }
            PublishError::MetadataUpdateFailed(_) => PublishStage::Reconciling,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PublishError::ContentTypeMissing
            | PublishError::ContentTypeUnsupported(_)
            | PublishError::PayloadTooLarge { .. }
            | PublishError::UploadInterrupted { .. } => ErrorCategory::Validation,
            PublishError::RecordNotFound(_) | PublishError::NotAuthorized { .. } => {
                ErrorCategory::Authorization
            }
            PublishError::ProbeFailed(_)
            | PublishError::NoStreamsFound
            | PublishError::NormalizeFailed(_) => ErrorCategory::ToolExecution,
            PublishError::MetadataLookupFailed(_)
            | PublishError::StagingIo(_)
            | PublishError::EntropyUnavailable(_)
            | PublishError::PublishFailed(_)
            | PublishError::MetadataUpdateFailed(_) => ErrorCategory::Storage,
        }
    }

    fn from_tool(stage: PublishStage, err: ProcessingError) -> Self {
        match (stage, err) {
            (_, ProcessingError::NoStreamsFound) => PublishError::NoStreamsFound,
            (_, ProcessingError::ProbeFailed(msg)) => PublishError::ProbeFailed(msg),
            (_, ProcessingError::NormalizeFailed(msg)) => PublishError::NormalizeFailed(msg),
            (PublishStage::Probing, other) => PublishError::ProbeFailed(other.to_string()),
            (_, other) => PublishError::NormalizeFailed(other.to_string()),
        }
    }
}

impl From<StagingError> for PublishError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::Validation(ValidationError::ContentTypeMissing) => {
                PublishError::ContentTypeMissing
            }
            StagingError::Validation(ValidationError::ContentTypeUnsupported {
                content_type,
                ..
            }) => PublishError::ContentTypeUnsupported(content_type),
            StagingError::Validation(ValidationError::FileTooLarge { max }) => {
                PublishError::PayloadTooLarge { max_bytes: max }
            }
            StagingError::Interrupted(e) => PublishError::UploadInterrupted {
                too_large: e.too_large,
                message: e.message,
            },
            StagingError::Io(e) => PublishError::StagingIo(e),
        }
    }
}

impl From<StorageError> for PublishError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Entropy(e) => PublishError::from(e),
            other => PublishError::PublishFailed(other),
        }
    }
}

impl From<KeyError> for PublishError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::EntropyUnavailable(msg) => PublishError::EntropyUnavailable(msg),
        }
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::RecordNotFound(_) => AppError::NotFound(err.to_string()),
            PublishError::NotAuthorized { .. } => {
                AppError::Forbidden("User not authorized to edit video".to_string())
            }
            PublishError::ContentTypeMissing => {
                AppError::BadRequest("Missing Content-Type header".to_string())
            }
            PublishError::ContentTypeUnsupported(_) => AppError::BadRequest(err.to_string()),
            PublishError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            PublishError::UploadInterrupted { too_large: true, .. } => {
                AppError::PayloadTooLarge(err.to_string())
            }
            PublishError::UploadInterrupted { .. } => AppError::BadRequest(err.to_string()),
            PublishError::ProbeFailed(_)
            | PublishError::NoStreamsFound
            | PublishError::NormalizeFailed(_) => AppError::MediaProcessing(err.to_string()),
            PublishError::PublishFailed(_) => AppError::Storage(err.to_string()),
            PublishError::MetadataLookupFailed(_) | PublishError::MetadataUpdateFailed(_) => {
                AppError::MetadataStore(err.to_string())
            }
            PublishError::StagingIo(_) | PublishError::EntropyUnavailable(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

/// Outcome of a successful publish
#[derive(Debug, Clone)]
pub struct Published {
    /// Record as persisted after reconciliation
    pub video: VideoRecord,
    /// Key the asset was written under
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct AssetPublisherConfig {
    pub staging_dir: PathBuf,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
}

/// Orchestrates a single publish per request
#[derive(Clone)]
pub struct AssetPublisher {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    thumbnails: Arc<dyn ThumbnailStore>,
    prober: Arc<dyn MediaProber>,
    normalizer: Arc<dyn MediaNormalizer>,
    video_validator: MediaValidator,
    thumbnail_validator: MediaValidator,
    staging_dir: PathBuf,
}

fn enter(stage: PublishStage, video_id: Uuid) {
    tracing::debug!(stage = stage.as_str(), video_id = %video_id, "Publish stage");
}

impl AssetPublisher {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        thumbnails: Arc<dyn ThumbnailStore>,
        prober: Arc<dyn MediaProber>,
        normalizer: Arc<dyn MediaNormalizer>,
        config: AssetPublisherConfig,
    ) -> Self {
        Self {
            videos,
            storage,
            thumbnails,
            prober,
            normalizer,
            video_validator: MediaValidator::video(config.max_video_size_bytes),
            thumbnail_validator: MediaValidator::thumbnail(config.max_thumbnail_size_bytes),
            staging_dir: config.staging_dir,
        }
    }

    pub fn thumbnails(&self) -> &Arc<dyn ThumbnailStore> {
        &self.thumbnails
    }

    /// Publish a video upload for `video_id` on behalf of `principal`.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, principal = %principal))]
    pub async fn publish_video<R>(
        &self,
        principal: Uuid,
        video_id: Uuid,
        content_type: Option<&str>,
        body: R,
    ) -> Result<Published, PublishError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let result = self
            .run_video(principal, video_id, content_type, body)
            .await;
        log_outcome("video", video_id, &result);
        result
    }

    /// Publish a thumbnail image for `video_id` on behalf of `principal`.
    #[tracing::instrument(skip(self, body), fields(video_id = %video_id, principal = %principal))]
    pub async fn publish_thumbnail<R>(
        &self,
        principal: Uuid,
        video_id: Uuid,
        content_type: Option<&str>,
        body: R,
    ) -> Result<Published, PublishError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let result = self
            .run_thumbnail(principal, video_id, content_type, body)
            .await;
        log_outcome("thumbnail", video_id, &result);
        result
    }

    async fn authorize(&self, principal: Uuid, video_id: Uuid) -> Result<VideoRecord, PublishError> {
        enter(PublishStage::Authorizing, video_id);

        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(|e| PublishError::MetadataLookupFailed(e.to_string()))?
            .ok_or(PublishError::RecordNotFound(video_id))?;

        if !video.is_owned_by(principal) {
            return Err(PublishError::NotAuthorized {
                video_id,
                principal,
            });
        }

        Ok(video)
    }

    async fn run_video<R>(
        &self,
        principal: Uuid,
        video_id: Uuid,
        content_type: Option<&str>,
        body: R,
    ) -> Result<Published, PublishError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut video = self.authorize(principal, video_id).await?;

        enter(PublishStage::Staging, video_id);
        let staged = stage(body, content_type, &self.video_validator, &self.staging_dir).await?;

        enter(PublishStage::Probing, video_id);
        let probe = self
            .prober
            .probe(staged.path())
            .await
            .map_err(|e| PublishError::from_tool(PublishStage::Probing, e))?;

        enter(PublishStage::Classifying, video_id);
        let orientation = OrientationClass::from_probe(&probe);
        tracing::debug!(
            video_id = %video_id,
            display_aspect_ratio = probe.display_aspect_ratio.as_deref().unwrap_or(""),
            orientation = orientation.as_str(),
            "Video classified"
        );

        enter(PublishStage::Normalizing, video_id);
        let normalized = self
            .normalizer
            .normalize(staged.path())
            .await
            .map_err(|e| PublishError::from_tool(PublishStage::Normalizing, e))?;

        enter(PublishStage::Publishing, video_id);
        let key = generate_storage_key(orientation.as_str(), staged.extension())?;
        let file = tokio::fs::File::open(normalized.path())
            .await
            .map_err(|e| PublishError::PublishFailed(StorageError::from(e)))?;
        let content_length = file.metadata().await.ok().map(|m| m.len());
        let url = self
            .storage
            .upload_stream(&key, staged.content_type(), content_length, Box::pin(file))
            .await?;

        enter(PublishStage::Reconciling, video_id);
        video.video_url = Some(url);
        let video = self
            .videos
            .update_video(&video)
            .await
            .map_err(|e| PublishError::MetadataUpdateFailed(e.to_string()))?;

        enter(PublishStage::Done, video_id);
        Ok(Published { video, key })
    }

    async fn run_thumbnail<R>(
        &self,
        principal: Uuid,
        video_id: Uuid,
        content_type: Option<&str>,
        body: R,
    ) -> Result<Published, PublishError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut video = self.authorize(principal, video_id).await?;

        enter(PublishStage::Staging, video_id);
        let mut staged = stage(
            body,
            content_type,
            &self.thumbnail_validator,
            &self.staging_dir,
        )
        .await?;

        enter(PublishStage::Publishing, video_id);
        let data = staged.read_all().await.map_err(PublishError::StagingIo)?;
        let key = self
            .thumbnails
            .put(video_id, data, staged.content_type())
            .await?;

        enter(PublishStage::Reconciling, video_id);
        video.thumbnail_url = Some(self.thumbnails.url_for(&key));
        let video = self
            .videos
            .update_video(&video)
            .await
            .map_err(|e| PublishError::MetadataUpdateFailed(e.to_string()))?;

        enter(PublishStage::Done, video_id);
        Ok(Published { video, key })
    }
}

fn log_outcome(asset: &'static str, video_id: Uuid, result: &Result<Published, PublishError>) {
    match result {
        Ok(published) => tracing::info!(
            asset,
            video_id = %video_id,
            key = %published.key,
            "Asset published"
        ),
        Err(e) => match e.category() {
            ErrorCategory::Validation | ErrorCategory::Authorization => tracing::debug!(
                asset,
                video_id = %video_id,
                stage = e.stage().as_str(),
                error = %e,
                "Publish rejected"
            ),
            ErrorCategory::ToolExecution | ErrorCategory::Storage => tracing::error!(
                asset,
                video_id = %video_id,
                stage = e.stage().as_str(),
                error = %e,
                "Publish failed"
            ),
        },
    }
}
