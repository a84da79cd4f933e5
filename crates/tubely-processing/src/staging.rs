//! Staging of inbound uploads onto local disk.
//!
//! A [`StagedFile`] owns a temporary file that is removed when the handle is dropped,
//! whatever the outcome of the surrounding publish.

use crate::validator::{MediaValidator, ValidationError};
use bytes::Bytes;
use std::io::{self, SeekFrom};
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

const STAGING_PREFIX: &str = "tubely-upload";

/// The inbound body broke off before its end, as reported by the transport.
///
/// Readers handed to [`stage`] wrap this in an `io::Error` so it survives the copy and
/// can be told apart from a local disk failure.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct UploadInterrupted {
    /// The request body limit was hit
    pub too_large: bool,
    pub message: String,
}

impl UploadInterrupted {
    pub fn new(too_large: bool, message: impl Into<String>) -> Self {
        Self {
            too_large,
            message: message.into(),
        }
    }
}

impl From<UploadInterrupted> for io::Error {
    fn from(err: UploadInterrupted) -> Self {
        io::Error::other(err)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Upload interrupted: {0}")]
    Interrupted(UploadInterrupted),

    #[error("Failed to stage upload: {0}")]
    Io(#[from] io::Error),
}

fn copy_error(err: io::Error) -> StagingError {
    match err.downcast::<UploadInterrupted>() {
        Ok(interrupted) => StagingError::Interrupted(interrupted),
        Err(err) => StagingError::Io(err),
    }
}

/// An upload written to a temporary file, rewound to offset 0.
#[derive(Debug)]
pub struct StagedFile {
    file: File,
    path: TempPath,
    content_type: &'static str,
    extension: &'static str,
    size_bytes: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized declared media type
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Extension including the leading dot
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// Read the whole staged payload from the current position.
    pub async fn read_all(&mut self) -> io::Result<Bytes> {
        let mut buffer = Vec::with_capacity(self.size_bytes as usize);
        self.file.read_to_end(&mut buffer).await?;
        Ok(Bytes::from(buffer))
    }
}

/// Validate the declared content type, then copy `reader` into a fresh temporary file
/// under `staging_dir`.
///
/// At most `validator.max_file_size()` bytes are accepted; one byte more fails with
/// `FileTooLarge` and the partial file is removed.
pub async fn stage<R>(
    reader: R,
    declared_content_type: Option<&str>,
    validator: &MediaValidator,
    staging_dir: &Path,
) -> Result<StagedFile, StagingError>
where
    R: AsyncRead + Unpin,
{
    let (content_type, extension) = validator.validate_content_type(declared_content_type)?;

    let named = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(extension)
        .tempfile_in(staging_dir)?;
    let (std_file, path) = named.into_parts();
    let mut file = File::from_std(std_file);

    let limit = validator.max_file_size();
    let mut limited = reader.take(limit.saturating_add(1));
    let size_bytes = tokio::io::copy(&mut limited, &mut file)
        .await
        .map_err(copy_error)?;
    validator.validate_file_size(size_bytes)?;

    file.flush().await?;
    file.seek(SeekFrom::Start(0)).await?;

    tracing::debug!(
        path = %path.display(),
        content_type = %content_type,
        size_bytes,
        "Upload staged"
    );

    Ok(StagedFile {
        file,
        path,
        content_type,
        extension,
        size_bytes,
    })
}

/// Yields `prefix`, then fails with `err`.
#[cfg(test)]
pub(crate) fn failing_body(
    prefix: &'static [u8],
    err: io::Error,
) -> impl AsyncRead + Unpin + Send {
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    struct FailingRead(Option<io::Error>);

    impl AsyncRead for FailingRead {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _: &mut Context<'_>,
            _: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let err = self
                .0
                .take()
                .unwrap_or_else(|| io::Error::other("read after failure"));
            Poll::Ready(Err(err))
        }
    }

    prefix.chain(FailingRead(Some(err)))
}

/// Yields `prefix`, then fails the way a broken-off request body does.
#[cfg(test)]
pub(crate) fn interrupted_body(
    prefix: &'static [u8],
    too_large: bool,
) -> impl AsyncRead + Unpin + Send {
    failing_body(
        prefix,
        UploadInterrupted::new(too_large, "incomplete multipart body").into(),
    )
}
