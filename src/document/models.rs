//! Core data structures for extraction results
//!
//! This module defines the public types produced by an extraction: comments,
//! tracked revisions, comment references, annotated paragraphs and the summary.
//! Serde field names follow the JSON record consumers read.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Comment definitions keyed by comment id
pub type CommentTable = HashMap<String, Comment>;

/// A comment as defined in `word/comments.xml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionKind {
    Insertion,
    Deletion,
}

impl fmt::Display for RevisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insertion => write!(f, "insertion"),
            Self::Deletion => write!(f, "deletion"),
        }
    }
}

/// A tracked insertion or deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Sequential id shared by both kinds, in document order
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: RevisionKind,
    pub author: String,
    pub date: String,
    pub text: String,
    /// 1-based index of the paragraph element holding the revision
    #[serde(rename = "paragraph")]
    pub paragraph_index: usize,
}

/// A comment bound to the paragraph where its anchor range closes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentReference {
    pub comment_id: String,
    #[serde(rename = "paragraph")]
    pub paragraph_index: usize,
    #[serde(flatten)]
    pub comment: Comment,
}

impl CommentReference {
    pub fn author(&self) -> &str {
        &self.comment.author
    }
}

/// Annotated paragraph text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_paragraphs: usize,
    pub tracked_changes: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub comments: usize,
    pub authors: BTreeSet<String>,
}

/// Non-fatal findings collected during one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Comment range boundaries whose id has no definition
    #[serde(default, skip_serializing_if = "is_zero")]
    pub orphaned_comment_ranges: usize,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.orphaned_comment_ranges == 0
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub file: String,
    pub summary: Summary,
    #[serde(rename = "tracked_changes")]
    pub revisions: Vec<Revision>,
    pub comments: Vec<CommentReference>,
    #[serde(rename = "document_content")]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default, skip_serializing_if = "Diagnostics::is_empty")]
    pub diagnostics: Diagnostics,
}
