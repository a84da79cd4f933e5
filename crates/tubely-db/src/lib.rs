//! Tubely metadata store
//!
//! Repositories for [`VideoRecord`](tubely_core::models::VideoRecord) persistence:
//! PostgreSQL through sqlx, plus an in-memory implementation for development and tests.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
