//! Tubely API Library
//!
//! This crate provides the HTTP handlers, the bearer-token auth capability and
//! application setup around the asset publisher.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
