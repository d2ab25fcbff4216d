//! Inline marker syntax for revisions and comment anchors
//!
//! Paragraph text carries its annotations inline:
//!
//! - `[+INS:<id>]<text>[/INS]` inserted span
//! - `[-DEL:<id>]<text>[/DEL]` deleted span
//! - `[COMMENT:<id>>>]` ... `[<<COMMENT:<id>]` comment anchor range
//!
//! Literal document text that happens to look like a marker is not escaped.

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::RevisionKind;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)\[\+INS:(\d+)\](.*?)\[/INS\]|\[-DEL:(\d+)\](.*?)\[/DEL\]|\[COMMENT:([^\]]*?)>>\]|\[<<COMMENT:([^\]]*?)\]",
    )
    .expect("marker pattern is valid")
});

pub fn revision_marker(kind: RevisionKind, id: usize, text: &str) -> String {
    match kind {
        RevisionKind::Insertion => format!("[+INS:{id}]{text}[/INS]"),
        RevisionKind::Deletion => format!("[-DEL:{id}]{text}[/DEL]"),
    }
}

pub fn comment_start_marker(id: &str) -> String {
    format!("[COMMENT:{id}>>]")
}

pub fn comment_end_marker(id: &str) -> String {
    format!("[<<COMMENT:{id}]")
}

/// A piece of annotated paragraph text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Revision {
        kind: RevisionKind,
        id: usize,
        text: &'a str,
    },
    CommentStart(&'a str),
    CommentEnd(&'a str),
}

/// Split annotated text into plain text and markers, in order
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut result = Vec::new();
    let mut last = 0;

    for caps in MARKER_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            result.push(Segment::Text(&text[last..whole.start()]));
        }

        let segment = if let (Some(id), Some(body)) = (caps.get(1), caps.get(2)) {
            revision_segment(RevisionKind::Insertion, id.as_str(), body.as_str())
        } else if let (Some(id), Some(body)) = (caps.get(3), caps.get(4)) {
            revision_segment(RevisionKind::Deletion, id.as_str(), body.as_str())
        } else if let Some(id) = caps.get(5) {
            Some(Segment::CommentStart(id.as_str()))
        } else {
            caps.get(6).map(|id| Segment::CommentEnd(id.as_str()))
        };

        // An id too large for usize is left as plain text
        result.push(segment.unwrap_or(Segment::Text(whole.as_str())));
        last = whole.end();
    }

    if last < text.len() {
        result.push(Segment::Text(&text[last..]));
    }

    result
}

fn revision_segment<'a>(kind: RevisionKind, id: &str, text: &'a str) -> Option<Segment<'a>> {
    id.parse()
        .ok()
        .map(|id| Segment::Revision { kind, id, text })
}
