//! Summary statistics over an annotation pass

use std::collections::BTreeSet;

use super::models::*;

pub fn summarize(
    paragraphs: &[Paragraph],
    revisions: &[Revision],
    comments: &[CommentReference],
) -> Summary {
    let insertions = revisions
        .iter()
        .filter(|r| r.kind == RevisionKind::Insertion)
        .count();

    let authors: BTreeSet<String> = revisions
        .iter()
        .map(|r| r.author.clone())
        .chain(comments.iter().map(|c| c.author().to_string()))
        .collect();

    Summary {
        total_paragraphs: paragraphs.len(),
        tracked_changes: revisions.len(),
        insertions,
        deletions: revisions.len() - insertions,
        comments: comments.len(),
        authors,
    }
}
