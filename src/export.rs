//! JSON and plain-text renderings of an extraction

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::document::ExtractionResult;

/// The record printed for one input: the extraction or a single error
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
    Extracted(&'a ExtractionResult),
    Failed { error: String },
}

impl<'a> Report<'a> {
    pub fn from_result(result: &'a crate::Result<ExtractionResult>) -> Self {
        match result {
            Ok(extraction) => Report::Extracted(extraction),
            Err(e) => Report::Failed {
                error: e.to_string(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Report::Failed { .. })
    }
}

pub fn export_to_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

pub fn export_to_text(result: &ExtractionResult) -> Result<String> {
    let mut output = String::new();
    let summary = &result.summary;

    writeln!(output, "File: {}", result.file)?;
    writeln!(output)?;
    writeln!(output, "Summary")?;
    writeln!(output, "- Paragraphs: {}", summary.total_paragraphs)?;
    writeln!(
        output,
        "- Tracked changes: {} ({} insertions, {} deletions)",
        summary.tracked_changes, summary.insertions, summary.deletions
    )?;
    writeln!(output, "- Comments: {}", summary.comments)?;
    if !summary.authors.is_empty() {
        let authors: Vec<&str> = summary.authors.iter().map(String::as_str).collect();
        writeln!(output, "- Authors: {}", authors.join(", "))?;
    }

    if !result.revisions.is_empty() {
        writeln!(output)?;
        writeln!(output, "Tracked changes")?;
        for revision in &result.revisions {
            write!(
                output,
                "{:>4}. [{}] paragraph {}, {}",
                revision.id, revision.kind, revision.paragraph_index, revision.author
            )?;
            if !revision.date.is_empty() {
                write!(output, " ({})", revision.date)?;
            }
            writeln!(output, ": \"{}\"", revision.text)?;
        }
    }

    if !result.comments.is_empty() {
        writeln!(output)?;
        writeln!(output, "Comments")?;
        for reference in &result.comments {
            writeln!(
                output,
                "{:>4}. paragraph {}, {}: {}",
                reference.comment_id,
                reference.paragraph_index,
                reference.author(),
                reference.comment.text
            )?;
        }
    }

    if !result.paragraphs.is_empty() {
        writeln!(output)?;
        writeln!(output, "Content")?;
        for paragraph in &result.paragraphs {
            writeln!(output, "[{}] {}", paragraph.index, paragraph.text)?;
        }
    }

    for warning in &result.diagnostics.warnings {
        writeln!(output)?;
        writeln!(output, "Warning: {warning}")?;
    }

    Ok(output)
}
