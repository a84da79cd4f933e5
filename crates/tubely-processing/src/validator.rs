//! Declared content type checks for inbound uploads.

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing Content-Type")]
    ContentTypeMissing,

    #[error("Unsupported content type: {content_type} (allowed: {allowed:?})")]
    ContentTypeUnsupported {
        content_type: String,
        allowed: Vec<&'static str>,
    },

    #[error("File too large (max: {max} bytes)")]
    FileTooLarge { max: u64 },
}

/// Content types accepted as video thumbnails, with the extension each is stored under.
pub const THUMBNAIL_TYPES: &[(&str, &str)] = &[("image/png", ".png"), ("image/jpeg", ".jpeg")];

/// Content types accepted as videos.
pub const VIDEO_TYPES: &[(&str, &str)] = &[("video/mp4", ".mp4")];

/// Upload policy: a content type allowlist plus a hard byte ceiling
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: u64,
    allowed: &'static [(&'static str, &'static str)],
}

impl MediaValidator {
    pub fn new(max_file_size: u64, allowed: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            max_file_size,
            allowed,
        }
    }

    pub fn video(max_file_size: u64) -> Self {
        Self::new(max_file_size, VIDEO_TYPES)
    }

    pub fn thumbnail(max_file_size: u64) -> Self {
        Self::new(max_file_size, THUMBNAIL_TYPES)
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn allowed_content_types(&self) -> Vec<&'static str> {
        self.allowed.iter().map(|(ct, _)| *ct).collect()
    }

    /// Check a declared content type against the allowlist.
    ///
    /// Returns the normalized media type and the extension it maps to.
    pub fn validate_content_type(
        &self,
        declared: Option<&str>,
    ) -> Result<(&'static str, &'static str), ValidationError> {
        let media_type = declared
            .and_then(normalize_media_type)
            .ok_or(ValidationError::ContentTypeMissing)?;

        self.allowed
            .iter()
            .find(|(ct, _)| *ct == media_type)
            .copied()
            .ok_or_else(|| ValidationError::ContentTypeUnsupported {
                content_type: media_type,
                allowed: self.allowed_content_types(),
            })
    }

    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                max: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// Strip parameters (`; charset=...`) and lowercase a media type.
///
/// Returns `None` for an empty or blank value.
pub fn normalize_media_type(raw: &str) -> Option<String> {
    let essence = raw.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        return None;
    }
    Some(essence.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_types_map_to_extensions() {
        let validator = MediaValidator::thumbnail(1024);
        assert_eq!(
            validator.validate_content_type(Some("image/png")).unwrap(),
            ("image/png", ".png")
        );
        assert_eq!(
            validator.validate_content_type(Some("image/jpeg")).unwrap(),
            ("image/jpeg", ".jpeg")
        );
    }

    #[test]
    fn test_parameters_and_case_are_ignored() {
        let validator = MediaValidator::video(1024);
        assert_eq!(
            validator
                .validate_content_type(Some("Video/MP4; codecs=avc1"))
                .unwrap(),
            ("video/mp4", ".mp4")
        );
    }

    #[test]
    fn test_missing_content_type() {
        let validator = MediaValidator::thumbnail(1024);
        assert!(matches!(
            validator.validate_content_type(None),
            Err(ValidationError::ContentTypeMissing)
        ));
        assert!(matches!(
            validator.validate_content_type(Some("  ")),
            Err(ValidationError::ContentTypeMissing)
        ));
    }

    #[test]
    fn test_unsupported_content_type() {
        let validator = MediaValidator::thumbnail(1024);
        let err = validator
            .validate_content_type(Some("application/octet-stream"))
            .unwrap_err();
        match err {
            ValidationError::ContentTypeUnsupported {
                content_type,
                allowed,
            } => {
                assert_eq!(content_type, "application/octet-stream");
                assert_eq!(allowed, vec!["image/png", "image/jpeg"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // A video is not a thumbnail and vice versa
        assert!(validator.validate_content_type(Some("video/mp4")).is_err());
        assert!(MediaValidator::video(1024)
            .validate_content_type(Some("image/png"))
            .is_err());
    }

    #[test]
    fn test_file_size_ceiling_is_inclusive() {
        let validator = MediaValidator::thumbnail(10);
        assert!(validator.validate_file_size(10).is_ok());
        assert!(matches!(
            validator.validate_file_size(11),
            Err(ValidationError::FileTooLarge { max: 10 })
        ));
    }
}
