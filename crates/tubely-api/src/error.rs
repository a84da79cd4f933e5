//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors convert
//! into `AppError` first so every failure renders with one status code and one
//! `ErrorResponse` body.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::PublishError;
use tubely_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: IntoResponse and AppError are both foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<PublishError> for HttpAppError {
    fn from(err: PublishError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            StorageError::Entropy(err) => AppError::Internal(err.to_string()),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

/// Malformed multipart bodies are client errors; an exceeded body limit is a 413.
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

fn error_body(app_error: &AppError, hide_details: bool) -> ErrorResponse {
    let (details, error_type) = if hide_details {
        (None, None)
    } else {
        (
            Some(app_error.detailed_message()),
            Some(app_error.error_type().to_string()),
        )
    };

    ErrorResponse {
        error: app_error.client_message(),
        details,
        error_type,
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details are hidden in production and for sensitive errors (tool output, backend messages).
        let body = error_body(app_error, is_production_env() || app_error.is_sensitive());

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_sensitive_error_hides_details() {
        let err = AppError::MediaProcessing("ffprobe: moov atom not found".to_string());
        let body = error_body(&err, err.is_sensitive());
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
        assert_eq!(body.code, "MEDIA_PROCESSING_ERROR");
        assert!(!body.error.contains("moov"));
    }

    #[test]
    fn test_client_error_keeps_details() {
        let err = AppError::BadRequest("Invalid file type".to_string());
        let body = error_body(&err, err.is_sensitive());
        assert_eq!(body.error, "Invalid file type");
        assert_eq!(body.error_type.as_deref(), Some("BadRequest"));
        assert!(body.details.is_some());
    }

    #[test]
    fn test_publish_error_status() {
        let err = HttpAppError::from(PublishError::NotAuthorized {
            video_id: Uuid::new_v4(),
            principal: Uuid::new_v4(),
        });
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let err = HttpAppError::from(PublishError::PayloadTooLarge { max_bytes: 10 });
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_storage_not_found_is_404() {
        let err = HttpAppError::from(StorageError::NotFound("thumbnail".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
