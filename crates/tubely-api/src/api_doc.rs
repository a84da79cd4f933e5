//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video and thumbnail publishing. Uploads are validated, staged, probed for orientation, normalized for progressive playback and published to durable storage before the video record is updated."
    ),
    paths(
        // Videos
        handlers::video_upload::upload_video,
        // Thumbnails
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::thumbnail_get::get_thumbnail,
    ),
    components(
        schemas(
            models::VideoResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video upload and publishing"),
        (name = "thumbnails", description = "Thumbnail upload and serving")
    )
)]
pub struct ApiDoc;
