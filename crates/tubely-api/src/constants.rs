//! API constants
//!
//! Route paths are fixed; clients of the original service depend on them.

/// API base path prefix
pub const API_BASE: &str = "/api";

/// Multipart field carrying the video upload
pub const VIDEO_FIELD: &str = "video";

/// Multipart field carrying the thumbnail upload
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Headroom on top of the staging ceiling for multipart framing and other fields
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Issuer stamped into and required from access tokens
pub const JWT_ISSUER: &str = "tubely-access";

/// Body limit for an upload route, given the staging ceiling in bytes
pub fn upload_body_limit(max_file_size_bytes: u64) -> usize {
    usize::try_from(max_file_size_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_body_limit_adds_overhead() {
        assert_eq!(upload_body_limit(10), 10 + MULTIPART_OVERHEAD_BYTES as usize);
    }

    #[test]
    fn test_upload_body_limit_saturates() {
        assert_eq!(upload_body_limit(u64::MAX), usize::MAX);
    }
}
