//! Tubely Storage Library
//!
//! This crate provides the storage abstractions used by the publishing pipeline:
//!
//! - the durable object store ([`Storage`]) with S3 and local filesystem backends,
//! - the derived-asset store ([`ThumbnailStore`]) with filesystem and in-process backends,
//! - collision-resistant storage key generation ([`keys`]).
//!
//! # Storage key format
//!
//! Published video keys have the form `{orientation}/{token}{extension}` where the
//! token is 256 bits of OS entropy encoded as unpadded URL-safe base64. Keys must not
//! contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod thumbnail;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, create_thumbnail_store};
pub use keys::{generate_storage_key, generate_token, KeyError};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use thumbnail::{FilesystemThumbnailStore, MemoryThumbnailStore, Thumbnail, ThumbnailStore};
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::{StorageBackend, ThumbnailBackend};
