use super::{field_reader, missing_field, VideoIdParam};
use crate::auth::AuthenticatedUser;
use crate::constants::THUMBNAIL_FIELD;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use tubely_core::models::VideoResponse;

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{video_id}",
    tag = "thumbnails",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video record to attach the thumbnail to")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Part `thumbnail` with Content-Type image/png or image/jpeg"),
    responses(
        (status = 200, description = "Thumbnail published", body = VideoResponse),
        (status = 400, description = "Invalid id, malformed body, missing part or unsupported content type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or metadata failure", body = ErrorResponse)
    )
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    VideoIdParam(video_id): VideoIdParam,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    tracing::info!(
        video_id = %video_id,
        user_id = %user.user_id,
        "Uploading thumbnail"
    );

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let published = state
            .publisher
            .publish_thumbnail(
                user.user_id,
                video_id,
                content_type.as_deref(),
                field_reader(field),
            )
            .await?;

        return Ok(Json(VideoResponse::from(published.video)));
    }

    Err(missing_field(THUMBNAIL_FIELD))
}
