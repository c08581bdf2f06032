//! Error types for the Sera template tools

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for building and auditing templates
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The document could not be loaded or parsed as a whole
    #[error("Failed to read PDF {}: {source}", path.display())]
    PdfRead {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// General error
    #[error("{0}")]
    General(String),
}

/// A single annotation that could not be dereferenced or is malformed
///
/// Kept in an audit report in place of the annotation; it never fails the audit.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("annotation {index}: {message}")]
pub struct AnnotationError {
    /// 1-based position in the page's `/Annots`
    pub index: usize,
    pub message: String,
}
