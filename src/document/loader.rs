//! Extraction orchestration
//!
//! This module contains the entry points that run the whole pipeline for one
//! document: open the package, build the comment table, annotate the primary
//! part and summarize the result.

use std::io::{Read, Seek};
use std::path::Path;

use super::io::{validate_docx_path, Package, COMMENTS_PART};
use super::models::*;
use super::parsing::comments::build_comment_table;
use super::parsing::walker::annotate;
use super::summary::summarize;
use crate::error::Result;

/// Extract tracked changes, comments and annotated paragraphs from a `.docx` file
///
/// The path must exist and carry a `.docx` extension. The file handle is
/// released before this function returns, whatever the outcome.
pub fn extract_document(file_path: &Path) -> Result<ExtractionResult> {
    validate_docx_path(file_path)?;

    let package = Package::open(file_path)?;
    extract_package(package, file_path.display().to_string())
}

/// Extract from any seekable source, e.g. an in-memory buffer
///
/// `file` is reported as-is in [`ExtractionResult::file`].
pub fn extract_from_reader<R: Read + Seek>(
    reader: R,
    file: impl Into<String>,
) -> Result<ExtractionResult> {
    let package = Package::from_reader(reader)?;
    extract_package(package, file.into())
}

fn extract_package<R: Read + Seek>(
    mut package: Package<R>,
    file: String,
) -> Result<ExtractionResult> {
    let mut diagnostics = Diagnostics::default();

    // Comments first: the walker needs the table for range lookups
    let comments_part = match package.read_part(COMMENTS_PART) {
        Ok(part) => part,
        Err(e) => {
            log::warn!("Could not read comments: {e}");
            diagnostics
                .warnings
                .push(format!("Could not read comments: {e}"));
            None
        }
    };
    let comments = build_comment_table(comments_part.as_deref(), &mut diagnostics);

    let document_xml = package.read_document_part()?;
    drop(package);

    let annotation = annotate(&document_xml, &comments)?;
    diagnostics.orphaned_comment_ranges = annotation.orphaned_comment_ranges;

    let summary = summarize(
        &annotation.paragraphs,
        &annotation.revisions,
        &annotation.comments,
    );

    log::debug!(
        "{file}: {} paragraphs, {} tracked changes, {} comments",
        summary.total_paragraphs,
        summary.tracked_changes,
        summary.comments
    );

    Ok(ExtractionResult {
        file,
        summary,
        revisions: annotation.revisions,
        comments: annotation.comments,
        paragraphs: annotation.paragraphs,
        diagnostics,
    })
}
