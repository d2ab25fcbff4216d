//! redline: tracked changes and comments from .docx files
//!
//! This library reads Microsoft Word documents and reports every tracked
//! insertion, tracked deletion and comment, together with the paragraph text
//! annotated with inline revision and comment markers.

use serde::{Deserialize, Serialize};

pub mod ansi;
pub mod config;
pub mod document;
pub mod error;
pub mod export;

/// Output format options
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
    Ansi,
}

/// Color depth options for ANSI output
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorDepth {
    /// Auto-detect terminal color capabilities
    #[default]
    Auto,
    /// Monochrome (no colors)
    #[value(name = "1")]
    Monochrome,
    /// 16 colors
    #[value(name = "4")]
    Standard,
    /// 256 colors
    #[value(name = "8")]
    Extended,
    /// 24-bit true color
    #[value(name = "24")]
    TrueColor,
}

// Re-export commonly used types
pub use document::{extract_document, extract_from_reader, ExtractionResult};
pub use error::{Error, Result};
