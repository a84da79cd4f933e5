use super::VideoIdParam;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;
use tubely_storage::StorageError;

/// Serves thumbnails held by the in-memory derived-asset store.
#[utoipa::path(
    get,
    path = "/api/thumbnails/{video_id}",
    tag = "thumbnails",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video whose thumbnail to fetch")
    ),
    responses(
        (status = 200, description = "Thumbnail bytes with their stored Content-Type", content(
            (Vec<u8> = "image/png"),
            (Vec<u8> = "image/jpeg")
        )),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Thumbnail not found", body = ErrorResponse)
    )
)]
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    VideoIdParam(video_id): VideoIdParam,
) -> Result<Response, HttpAppError> {
    let thumbnail = state
        .thumbnails()
        .get(&video_id.to_string())
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
                HttpAppError(AppError::NotFound("Thumbnail not found".to_string()))
            }
            other => HttpAppError::from(other),
        })?;

    Ok((
        [(header::CONTENT_TYPE, thumbnail.content_type)],
        thumbnail.data,
    )
        .into_response())
}
