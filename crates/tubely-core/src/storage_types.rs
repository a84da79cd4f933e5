use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Durable object store backends
///
/// Defined in core because it's used in configuration and by the storage factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Derived-asset (thumbnail) store backends
///
/// `Memory` keeps thumbnails in process memory and loses them on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailBackend {
    Filesystem,
    Memory,
}

impl FromStr for ThumbnailBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filesystem" | "fs" => Ok(ThumbnailBackend::Filesystem),
            "memory" => Ok(ThumbnailBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid thumbnail backend: {}", s)),
        }
    }
}

impl Display for ThumbnailBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ThumbnailBackend::Filesystem => write!(f, "filesystem"),
            ThumbnailBackend::Memory => write!(f, "memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "local".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_thumbnail_backend_round_trips_display() {
        for backend in [ThumbnailBackend::Filesystem, ThumbnailBackend::Memory] {
            assert_eq!(backend.to_string().parse::<ThumbnailBackend>().unwrap(), backend);
        }
        assert_eq!(
            "fs".parse::<ThumbnailBackend>().unwrap(),
            ThumbnailBackend::Filesystem
        );
    }
}
