//! Fast-start remux through ffmpeg (stream copy, no re-encode).

use crate::error::{validate_executable, ProcessingError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Suffix appended to the input path to name the remuxed output
pub const NORMALIZED_SUFFIX: &str = ".processing";

/// Owned path to a derived file, removed on drop
///
/// Acquired before the producing tool runs, so a partially written output is
/// removed on failure as well.
#[derive(Debug)]
pub struct StagedPath {
    path: PathBuf,
}

impl StagedPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for StagedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedPath {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove staged file"
            ),
        }
    }
}

#[async_trait]
pub trait MediaNormalizer: Send + Sync {
    /// Rewrite `input` into a sibling streaming-optimized file.
    async fn normalize(&self, input: &Path) -> Result<StagedPath, ProcessingError>;
}

/// Sibling output path `{input}.processing`
pub fn normalized_path(input: &Path) -> PathBuf {
    let mut output: OsString = input.as_os_str().to_owned();
    output.push(NORMALIZED_SUFFIX);
    PathBuf::from(output)
}

/// `MediaNormalizer` backed by the ffmpeg executable
#[derive(Debug, Clone)]
pub struct FfmpegNormalizer {
    ffmpeg_path: String,
}

impl FfmpegNormalizer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Result<Self, ProcessingError> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_executable(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl MediaNormalizer for FfmpegNormalizer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart",
    ))]
    async fn normalize(&self, input: &Path) -> Result<StagedPath, ProcessingError> {
        let start = std::time::Instant::now();
        let output = StagedPath::new(normalized_path(input));

        let result = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ProcessingError::NormalizeFailed(format!("failed to execute ffmpeg: {}", e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                exit_status = %result.status,
                stderr = %stderr.trim(),
                "ffmpeg exited unsuccessfully"
            );
            return Err(ProcessingError::NormalizeFailed(format!(
                "ffmpeg exited with {}",
                result.status
            )));
        }

        tracing::info!(
            output = %output.path().display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fast-start remux completed"
        );

        Ok(output)
    }
}
