//! Comment table construction
//!
//! Reads `word/comments.xml` into a lookup table keyed by comment id. The part
//! is optional; a broken part yields an empty table and a warning instead of
//! failing the extraction.

use quick_xml::events::{BytesStart, Event};

use super::super::models::{Comment, CommentTable, Diagnostics};
use super::xml::{attribute, is_wordml, part_reader, PartStructure};

#[derive(Default)]
struct PendingComment {
    id: Option<String>,
    author: String,
    date: String,
    text: String,
}

/// Build the comment table from the raw comments part, if any
pub(crate) fn build_comment_table(
    part: Option<&[u8]>,
    diagnostics: &mut Diagnostics,
) -> CommentTable {
    let Some(bytes) = part else {
        return CommentTable::new();
    };

    match parse_comments(bytes) {
        Ok(table) => table,
        Err(message) => {
            log::warn!("Could not parse comments: {message}");
            diagnostics
                .warnings
                .push(format!("Could not parse comments: {message}"));
            CommentTable::new()
        }
    }
}

fn parse_comments(bytes: &[u8]) -> Result<CommentTable, String> {
    let mut reader = part_reader(bytes);
    let mut buf = Vec::new();
    let mut comments = CommentTable::new();
    let mut structure = PartStructure::default();

    let mut current: Option<PendingComment> = None;
    let mut in_text = false;

    loop {
        let (ns, event) = reader.read_resolved_event_into(&mut buf).map_err(|e| e.to_string())?;
        structure.observe(&ns, &event)?;

        match event {
            Event::Start(ref e) if is_wordml(&ns) => match e.local_name().as_ref() {
                b"comment" => current = Some(pending_comment(e)),
                b"t" if current.is_some() => in_text = true,
                _ => {}
            },
            Event::End(ref e) if is_wordml(&ns) => match e.local_name().as_ref() {
                b"comment" => {
                    if let Some(pending) = current.take() {
                        insert_comment(&mut comments, pending);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                if let Some(pending) = current.as_mut() {
                    pending.text.push_str(&text);
                }
            }
            Event::CData(ref e) if in_text => {
                if let Some(pending) = current.as_mut() {
                    pending.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    structure.finish()?;
    Ok(comments)
}

fn pending_comment(element: &BytesStart<'_>) -> PendingComment {
    PendingComment {
        id: attribute(element, b"id"),
        author: attribute(element, b"author").unwrap_or_else(|| "Unknown".to_string()),
        date: attribute(element, b"date").unwrap_or_default(),
        text: String::new(),
    }
}

fn insert_comment(comments: &mut CommentTable, pending: PendingComment) {
    let Some(id) = pending.id else {
        log::debug!("Skipping comment without an id");
        return;
    };

    // Duplicate ids: the later definition wins
    comments.insert(
        id.clone(),
        Comment {
            id,
            author: pending.author,
            date: pending.date,
            text: pending.text.trim().to_string(),
        },
    );
}
