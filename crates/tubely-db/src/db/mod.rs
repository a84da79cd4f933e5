//! Database repositories for the metadata store
//
// Video records (publisher reads and reconciles these)
pub mod video;
//
// Process-local store used when no DATABASE_URL is configured
pub mod memory;

pub use memory::InMemoryVideoRepository;
pub use video::{PgVideoRepository, VideoRepository};
