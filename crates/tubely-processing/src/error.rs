/// Failures of the external media tools
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Probe reported no streams")]
    NoStreamsFound,

    #[error("Normalize failed: {0}")]
    NormalizeFailed(String),

    #[error("Invalid executable path: {0}")]
    InvalidExecutable(String),
}

/// Reject executable paths carrying shell metacharacters or traversal.
pub(crate) fn validate_executable(path: &str) -> Result<(), ProcessingError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty()
        || path.contains("..")
        || path.chars().any(|c| dangerous_chars.contains(&c))
    {
        return Err(ProcessingError::InvalidExecutable(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_executable() {
        assert!(validate_executable("ffprobe").is_ok());
        assert!(validate_executable("/usr/local/bin/ffmpeg").is_ok());
        assert!(validate_executable("ffmpeg; rm -rf /").is_err());
        assert!(validate_executable("../bin/ffmpeg").is_err());
        assert!(validate_executable("").is_err());
    }
}
