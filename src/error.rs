//! Error types for PDF generation and composition

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering or composing PDFs
#[derive(Error, Debug)]
pub enum Error {
    /// A content/template file was missing or unreadable
    #[error("Failed to read template {}: {source}", path.display())]
    FileRead {
        /// The offending path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendering engine failed at some stage (launch, parameter
    /// injection, content load, or PDF production)
    #[error("Rendering failed: {0}")]
    Render(String),

    /// A page of a multi-page job failed; remaining pages were not rendered
    #[error("Multi-page rendering failed at page {page}: {source}")]
    MultiPageRender {
        /// 1-based index of the failing page spec
        page: usize,
        #[source]
        source: Box<Error>,
    },

    /// Composition failed: empty input list or an undecodable source document
    #[error("Merge failed: {0}")]
    Merge(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Render(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Merge(err.to_string())
    }
}
