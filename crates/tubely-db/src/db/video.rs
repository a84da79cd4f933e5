use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use tubely_core::{models::VideoRecord, AppError};
use uuid::Uuid;

/// Metadata store capability consumed by the publisher
///
/// Records are read and written whole; there is no version column, so two
/// concurrent writers to one record resolve as last-write-wins.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Look up a record. `Ok(None)` when absent, `Err` only on backend failure.
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Persist every mutable field of `video` and return the stored row.
    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError>;
}

const VIDEO_COLUMNS: &str =
    "id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at";

/// Repository for the `videos` table
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let video = sqlx::query_as::<Postgres, VideoRecord>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let updated = sqlx::query_as::<Postgres, VideoRecord>(&format!(
            r#"
            UPDATE videos
            SET title = $2, description = $3, thumbnail_url = $4, video_url = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))
    }
}
