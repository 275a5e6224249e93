//! Temp-file backed PDF byte streams
//!
//! The stream form of rendering writes the produced bytes to a uniquely
//! named file under a shared scratch directory and hands back a `PdfStream`
//! reading from it. The stream owns the file for its whole life: dropping
//! the stream removes the file, and removal failures are logged, never
//! surfaced.

use crate::{Error, Result};
use log::warn;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

/// Directory under the OS temp dir that holds in-flight PDF files
///
/// Shared by all generator instances; individual files are uniquely named.
pub(crate) fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join("rfpdf")
}

/// Write `bytes` to a uniquely named file in `dir`, creating the directory
/// if absent
///
/// The name carries a millisecond timestamp plus a random suffix. Returns a
/// `TempPath`, so every error path from here until the stream takes
/// ownership removes the file again.
pub(crate) fn write_scratch_file(dir: &Path, bytes: &[u8]) -> Result<TempPath> {
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::Render(format!(
            "Failed to create temp directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let mut file = tempfile::Builder::new()
        .prefix(&format!("pdf-{}-", millis))
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(|e| Error::Render(format!("Failed to create temp file: {}", e)))?;

    file.write_all(bytes)
        .map_err(|e| Error::Render(format!("Failed to write temp file: {}", e)))?;
    file.flush()
        .map_err(|e| Error::Render(format!("Failed to flush temp file: {}", e)))?;

    Ok(file.into_temp_path())
}

/// A readable PDF byte stream backed by a temp file that is deleted when
/// the stream is dropped
///
/// Implements [`tokio::io::AsyncRead`]; read it with the usual
/// `AsyncReadExt` adapters or hand it to a body type that consumes readers.
/// By the time a `PdfStream` is returned the PDF is fully written, so reads
/// never observe a partial document.
pub struct PdfStream {
    file: File,
    path: PathBuf,
    temp: Option<TempPath>,
}

impl PdfStream {
    /// Open a read stream over a scratch file, taking ownership of its path
    ///
    /// If opening fails the `TempPath` is dropped, which removes the file
    /// before the error propagates.
    pub(crate) async fn open(temp: TempPath) -> Result<Self> {
        let path = temp.to_path_buf();
        let file = File::open(&path)
            .await
            .map_err(|e| Error::Render(format!("Failed to open temp file {}: {}", path.display(), e)))?;

        Ok(Self {
            file,
            path,
            temp: Some(temp),
        })
    }

    /// Path of the backing temp file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsyncRead for PdfStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}

impl Drop for PdfStream {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            // Best-effort cleanup; the caller already has its data
            if let Err(e) = temp.close() {
                warn!("Failed to remove temp file {}: {}", self.path.display(), e);
            }
        }
    }
}
