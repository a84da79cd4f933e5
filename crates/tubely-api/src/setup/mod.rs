//! Application setup and initialization
//!
//! Startup order: validate configuration, tracing, metadata store, storage,
//! publisher, routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    // Metadata store (PostgreSQL, or in-memory when DATABASE_URL is unset)
    let videos = database::setup_database(&config).await?;

    // Durable object store and derived-asset store
    let (storage, thumbnails) = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, videos, storage, thumbnails)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
