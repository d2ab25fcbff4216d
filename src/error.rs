//! Error types for redline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Conditions that abort an extraction.
///
/// A missing or unreadable comments part is not represented here: it only
/// produces a warning and an empty comment table.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The input path does not carry a `.docx` extension.
    #[error("Not a DOCX file: {}", .0.display())]
    NotDocx(PathBuf),

    /// The input is not a readable zip container.
    #[error("Invalid or corrupted DOCX file: {0}")]
    InvalidPackage(String),

    /// The container has no `word/document.xml`.
    #[error("Invalid DOCX: missing word/document.xml")]
    MissingPrimaryPart,

    /// `word/document.xml` is present but is not well-formed XML.
    #[error("Failed to process DOCX: malformed word/document.xml: {0}")]
    InvalidPrimaryPart(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::InvalidPackage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingPrimaryPart;
        assert_eq!(err.to_string(), "Invalid DOCX: missing word/document.xml");

        let err = Error::NotDocx(PathBuf::from("notes.txt"));
        assert_eq!(err.to_string(), "Not a DOCX file: notes.txt");

        let err = Error::FileNotFound(PathBuf::from("missing.docx"));
        assert_eq!(err.to_string(), "File not found: missing.docx");
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::InvalidPackage(_)));

        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let err: Error = zip::result::ZipError::Io(io_err).into();
        assert!(matches!(err, Error::Io(_)));
    }
}
