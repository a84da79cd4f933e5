//! Tubely Media Processing Library
//!
//! Staging of inbound uploads, the external media tools (ffprobe, ffmpeg), orientation
//! classification and the [`AssetPublisher`] that ties them to storage and metadata.

pub mod classify;
pub mod error;
pub mod normalize;
pub mod probe;
pub mod publisher;
pub mod staging;
pub mod validator;

// Re-export commonly used types
pub use classify::OrientationClass;
pub use error::ProcessingError;
pub use normalize::{FfmpegNormalizer, MediaNormalizer, StagedPath};
pub use probe::{FfprobeProber, MediaProber, ProbeResult};
pub use publisher::{
    AssetPublisher, AssetPublisherConfig, ErrorCategory, PublishError, PublishStage, Published,
};
pub use staging::{stage, StagedFile, StagingError, UploadInterrupted};
pub use validator::{MediaValidator, ValidationError};
