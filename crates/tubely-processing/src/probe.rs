//! Stream metadata extraction through ffprobe.

use crate::error::{validate_executable, ProcessingError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Metadata read from a staged file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    /// Display aspect ratio of the first stream, as `W:H`
    pub display_aspect_ratio: Option<String>,
}

#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ProcessingError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    display_aspect_ratio: Option<String>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// An empty or absent `streams` array is `NoStreamsFound`; anything that is not
/// valid ffprobe JSON is `ProbeFailed`.
pub fn parse_ffprobe_output(stdout: &[u8]) -> Result<ProbeResult, ProcessingError> {
    let output: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::ProbeFailed(format!("unparseable ffprobe output: {}", e)))?;

    let first = output
        .streams
        .into_iter()
        .next()
        .ok_or(ProcessingError::NoStreamsFound)?;

    Ok(ProbeResult {
        display_aspect_ratio: first.display_aspect_ratio,
    })
}

/// `MediaProber` backed by the ffprobe executable
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self, ProcessingError> {
        let ffprobe_path = ffprobe_path.into();
        validate_executable(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
    ))]
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ProcessingError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProcessingError::ProbeFailed(format!("failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                exit_status = %output.status,
                stderr = %stderr.trim(),
                "ffprobe exited unsuccessfully"
            );
            return Err(ProcessingError::ProbeFailed(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        let result = parse_ffprobe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            display_aspect_ratio = result.display_aspect_ratio.as_deref().unwrap_or(""),
            "Probe completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_first_stream_ratio() {
        let stdout = br#"{
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1920, "height": 1080, "display_aspect_ratio": "16:9"},
                {"index": 1, "codec_type": "audio"}
            ]
        }"#;
        let result = parse_ffprobe_output(stdout).unwrap();
        assert_eq!(result.display_aspect_ratio.as_deref(), Some("16:9"));
    }

    #[test]
    fn test_first_stream_without_ratio() {
        let stdout = br#"{"streams": [{"index": 0, "codec_type": "audio"}]}"#;
        let result = parse_ffprobe_output(stdout).unwrap();
        assert_eq!(result.display_aspect_ratio, None);
    }

    #[test]
    fn test_no_streams_is_distinct_from_parse_failure() {
        assert!(matches!(
            parse_ffprobe_output(br#"{"streams": []}"#),
            Err(ProcessingError::NoStreamsFound)
        ));
        assert!(matches!(
            parse_ffprobe_output(br#"{}"#),
            Err(ProcessingError::NoStreamsFound)
        ));
        assert!(matches!(
            parse_ffprobe_output(b"moov atom not found"),
            Err(ProcessingError::ProbeFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_executable_is_probe_failure() {
        let prober = FfprobeProber::new("/nonexistent/tubely-ffprobe").unwrap();
        let result = prober.probe(Path::new("/tmp/does-not-matter.mp4")).await;
        assert!(matches!(result, Err(ProcessingError::ProbeFailed(_))));
    }
}
