//! Document extraction and data structures module
//!
//! This module reads Word (.docx) packages and turns their tracked changes,
//! comments and paragraph text into an [`ExtractionResult`].

pub(crate) mod io;
pub(crate) mod loader;
pub mod markers;
pub mod models;
pub(crate) mod parsing;
pub mod summary;

// Re-export all models and the extraction entry points
pub use io::{Package, COMMENTS_PART, DOCUMENT_PART};
pub use loader::{extract_document, extract_from_reader};
pub use models::*;
pub use summary::summarize;
