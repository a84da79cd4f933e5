//! Route configuration and setup.
//!
//! Health checks live in [health](health).

mod health;

use crate::api_doc::ApiDoc;
use crate::constants::{upload_body_limit, API_BASE};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend};
use utoipa::OpenApi;

const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1_024;

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS_ORIGINS entry: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Routes that need `AppState`; upload routes carry their own body limits.
fn api_routes(config: &Config, state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            &format!("{}/videos/{{video_id}}/upload", API_BASE),
            post(handlers::video_upload::upload_video).layer(DefaultBodyLimit::max(
                upload_body_limit(config.max_video_size_bytes()),
            )),
        )
        .route(
            &format!("{}/thumbnail_upload/{{video_id}}", API_BASE),
            post(handlers::thumbnail_upload::upload_thumbnail).layer(DefaultBodyLimit::max(
                upload_body_limit(config.max_thumbnail_size_bytes()),
            )),
        )
        .route(
            &format!("{}/thumbnails/{{video_id}}", API_BASE),
            get(handlers::thumbnail_get::get_thumbnail),
        )
        .with_state(state)
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let mut app = api_routes(config, state)
        .route("/health", get(health::liveness_check))
        .route(&format!("{}/openapi.json", API_BASE), get(openapi_json))
        .nest_service("/assets", ServeDir::new(config.assets_root()));

    if config.storage_backend() == StorageBackend::Local {
        app = app.nest_service("/media", ServeDir::new(config.local_storage_path()));
    }

    // Server-level concurrency limit; each upload holds a staged file on disk
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);

    let app = app
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!(
        assets_root = %config.assets_root().display(),
        storage_backend = %config.storage_backend(),
        http_concurrency_limit,
        "Routes configured"
    );

    Ok(app)
}
