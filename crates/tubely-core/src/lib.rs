//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration
//! that are shared across all Tubely components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{StorageBackend, ThumbnailBackend};
// Note: Storage, StorageError, StorageResult live in the tubely-storage crate
