//! Metadata store setup

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};

const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Connect to PostgreSQL and run migrations, or fall back to the in-memory store.
pub async fn setup_database(config: &Config) -> Result<Arc<dyn VideoRepository>> {
    let Some(database_url) = config.database_url() else {
        tracing::warn!("DATABASE_URL not set; using in-memory video metadata store");
        return Ok(Arc::new(InMemoryVideoRepository::new()));
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(DB_ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Run pending migrations on startup (path: workspace migrations/ from crate root)
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgVideoRepository::new(pool)))
}
