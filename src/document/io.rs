//! Package access and file validation
//!
//! This module opens the zip container and exposes its parts as raw bytes.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Location of the paragraph/run markup
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Location of the comment definitions
pub const COMMENTS_PART: &str = "word/comments.xml";

/// Upper bound on buffer preallocation from a part's declared size
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// An opened `.docx` container
///
/// The archive (and for [`Package::open`] the file handle) is released when the
/// package is dropped.
pub struct Package<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl Package<File> {
    /// Open a package from disk
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> Package<R> {
    /// Wrap any seekable source, checking the zip structure and the primary part
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive =
            ZipArchive::new(reader).map_err(|e| Error::InvalidPackage(e.to_string()))?;
        let package = Self { archive };

        if !package.has_part(DOCUMENT_PART) {
            return Err(Error::MissingPrimaryPart);
        }

        Ok(package)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Read a part into memory, `None` if the container has no such part
    pub fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut part = match self.archive.by_name(name) {
            Ok(part) => part,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::with_capacity(capacity_hint(part.size()));
        part.read_to_end(&mut bytes)
            .map_err(|e| Error::InvalidPackage(format!("{name}: {e}")))?;
        Ok(Some(bytes))
    }

    /// Read the primary content part
    pub fn read_document_part(&mut self) -> Result<Vec<u8>> {
        self.read_part(DOCUMENT_PART)?
            .ok_or(Error::MissingPrimaryPart)
    }
}

/// Buffer size to reserve for a part; the zip header size is not trusted
fn capacity_hint(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOCATION) as usize
}

/// Validates that the path names an existing `.docx` file
pub(crate) fn validate_docx_path(file_path: &Path) -> Result<()> {
    if !file_path.exists() {
        return Err(Error::FileNotFound(file_path.to_path_buf()));
    }

    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !extension.eq_ignore_ascii_case("docx") {
        return Err(Error::NotDocx(file_path.to_path_buf()));
    }

    Ok(())
}
