pub mod thumbnail_get;
pub mod thumbnail_upload;
pub mod video_upload;

use crate::error::HttpAppError;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::StatusCode;
use futures::TryStreamExt;
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tubely_core::AppError;
use tubely_processing::UploadInterrupted;
use uuid::Uuid;

/// `{video_id}` path parameter, rejected with 400 before any other extractor runs.
#[derive(Debug, Clone, Copy)]
pub struct VideoIdParam(pub Uuid);

impl<S> FromRequestParts<S> for VideoIdParam
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || HttpAppError(AppError::BadRequest("Invalid ID".to_string()));

        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;

        Uuid::parse_str(&raw).map(VideoIdParam).map_err(|_| invalid())
    }
}

pub(crate) fn missing_field(name: &str) -> HttpAppError {
    HttpAppError(AppError::BadRequest(format!(
        "Missing multipart field \"{}\"",
        name
    )))
}

/// A part that breaks off mid-stream surfaces from the reader as [`UploadInterrupted`].
fn interrupted(err: MultipartError) -> io::Error {
    let too_large = err.status() == StatusCode::PAYLOAD_TOO_LARGE;
    UploadInterrupted::new(too_large, err.body_text()).into()
}

/// Adapt a multipart part into a reader without buffering it.
pub(crate) fn field_reader(field: Field<'_>) -> impl AsyncRead + Unpin + Send + '_ {
    StreamReader::new(Box::pin(field.map_err(interrupted)))
}
