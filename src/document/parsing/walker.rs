//! Revision and comment annotation of the primary content part
//!
//! A single depth-first pass over `word/document.xml`. Every paragraph element
//! gets a 1-based index in start-tag order; its text leaves are concatenated,
//! tracked insertions and deletions become inline markers plus [`Revision`]
//! records, and comment range boundaries whose id is defined in the comment
//! table become anchor markers plus [`CommentReference`] records.
//!
//! All counters live in a [`WalkContext`] built fresh for each call.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use super::super::markers::{comment_end_marker, comment_start_marker, revision_marker};
use super::super::models::{CommentReference, CommentTable, Paragraph, Revision, RevisionKind};
use super::xml::{attribute, is_wordml, part_reader, PartStructure};
use crate::error::{Error, Result};

/// Output of one annotation pass
#[derive(Debug, Default)]
pub(crate) struct Annotation {
    pub(crate) paragraphs: Vec<Paragraph>,
    pub(crate) revisions: Vec<Revision>,
    pub(crate) comments: Vec<CommentReference>,
    /// Comment range boundaries inside paragraphs whose id is not in the table
    pub(crate) orphaned_comment_ranges: usize,
}

/// The closed set of elements the walker reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Paragraph,
    TextLeaf,
    Revision(RevisionKind),
    CommentRangeStart,
    CommentRangeEnd,
    Other,
}

impl NodeKind {
    fn classify(ns: &ResolveResult<'_>, element: &BytesStart<'_>) -> Self {
        if !is_wordml(ns) {
            return Self::Other;
        }
        match element.local_name().as_ref() {
            b"p" => Self::Paragraph,
            b"t" | b"delText" => Self::TextLeaf,
            b"ins" => Self::Revision(RevisionKind::Insertion),
            b"del" => Self::Revision(RevisionKind::Deletion),
            b"commentRangeStart" => Self::CommentRangeStart,
            b"commentRangeEnd" => Self::CommentRangeEnd,
            _ => Self::Other,
        }
    }
}

struct OpenParagraph {
    index: usize,
    buffer: String,
}

struct OpenRevision {
    /// Position of the record in the output revision list
    slot: usize,
    /// Number of open paragraphs when the revision started
    paragraph_depth: usize,
    /// Comment markers met inside the revision, emitted after its marker
    deferred: String,
}

/// Traversal state for one document
struct WalkContext<'a> {
    comments: &'a CommentTable,
    revision_counter: usize,
    paragraph_counter: usize,
    open_elements: Vec<NodeKind>,
    open_paragraphs: Vec<OpenParagraph>,
    open_revisions: Vec<OpenRevision>,
    output: Annotation,
}

impl<'a> WalkContext<'a> {
    fn new(comments: &'a CommentTable) -> Self {
        Self {
            comments,
            revision_counter: 0,
            paragraph_counter: 0,
            open_elements: Vec::new(),
            open_paragraphs: Vec::new(),
            open_revisions: Vec::new(),
            output: Annotation::default(),
        }
    }

    fn current_paragraph_index(&self) -> Option<usize> {
        self.open_paragraphs.last().map(|p| p.index)
    }

    fn start(&mut self, kind: NodeKind, element: &BytesStart<'_>) {
        // Revisions and comment ranges outside any paragraph are not tracked
        let kind = match (kind, self.current_paragraph_index()) {
            (NodeKind::Paragraph, _) => {
                self.paragraph_counter += 1;
                self.open_paragraphs.push(OpenParagraph {
                    index: self.paragraph_counter,
                    buffer: String::new(),
                });
                kind
            }
            (NodeKind::Revision(revision_kind), Some(paragraph_index)) => {
                self.open_revision(revision_kind, element, paragraph_index);
                kind
            }
            (NodeKind::CommentRangeStart, Some(_)) => {
                self.comment_range_start(element);
                kind
            }
            (NodeKind::CommentRangeEnd, Some(paragraph_index)) => {
                self.comment_range_end(element, paragraph_index);
                kind
            }
            (NodeKind::TextLeaf, _) => kind,
            (NodeKind::Revision(_), None)
            | (NodeKind::CommentRangeStart, None)
            | (NodeKind::CommentRangeEnd, None)
            | (NodeKind::Other, _) => NodeKind::Other,
        };
        self.open_elements.push(kind);
    }

    fn end(&mut self) {
        match self.open_elements.pop() {
            Some(NodeKind::Paragraph) => self.close_paragraph(),
            Some(NodeKind::Revision(_)) => self.close_revision(),
            Some(NodeKind::TextLeaf)
            | Some(NodeKind::CommentRangeStart)
            | Some(NodeKind::CommentRangeEnd)
            | Some(NodeKind::Other)
            | None => {}
        }
    }

    fn in_text_leaf(&self) -> bool {
        self.open_elements.last() == Some(&NodeKind::TextLeaf)
    }

    /// Append literal text from a text leaf
    fn text(&mut self, text: &str) {
        let depth = self.open_paragraphs.len();
        if depth == 0 {
            return;
        }

        // Text under open revisions of this paragraph belongs to all of them
        let mut captured = false;
        for open in self
            .open_revisions
            .iter()
            .rev()
            .take_while(|open| open.paragraph_depth == depth)
        {
            self.output.revisions[open.slot].text.push_str(text);
            captured = true;
        }

        if !captured {
            if let Some(paragraph) = self.open_paragraphs.last_mut() {
                paragraph.buffer.push_str(text);
            }
        }
    }

    /// Append a comment marker, after the enclosing revision marker if any
    fn push_marker(&mut self, marker: &str) {
        let depth = self.open_paragraphs.len();
        let outermost = self
            .open_revisions
            .iter_mut()
            .find(|open| open.paragraph_depth == depth);

        match outermost {
            Some(open) => open.deferred.push_str(marker),
            None => {
                if let Some(paragraph) = self.open_paragraphs.last_mut() {
                    paragraph.buffer.push_str(marker);
                }
            }
        }
    }

    fn open_revision(
        &mut self,
        kind: RevisionKind,
        element: &BytesStart<'_>,
        paragraph_index: usize,
    ) {
        self.revision_counter += 1;
        self.output.revisions.push(Revision {
            id: self.revision_counter,
            kind,
            author: attribute(element, b"author").unwrap_or_else(|| "Unknown".to_string()),
            date: attribute(element, b"date").unwrap_or_default(),
            text: String::new(),
            paragraph_index,
        });
        self.open_revisions.push(OpenRevision {
            slot: self.output.revisions.len() - 1,
            paragraph_depth: self.open_paragraphs.len(),
            deferred: String::new(),
        });
    }

    fn close_revision(&mut self) {
        let Some(open) = self.open_revisions.pop() else {
            return;
        };

        let nested = self
            .open_revisions
            .last()
            .is_some_and(|parent| parent.paragraph_depth == open.paragraph_depth);

        if nested {
            // Only the outermost revision is written out; its text already
            // includes ours.
            if let Some(parent) = self.open_revisions.last_mut() {
                parent.deferred.push_str(&open.deferred);
            }
            return;
        }

        let revision = &self.output.revisions[open.slot];
        let marker = revision_marker(revision.kind, revision.id, &revision.text);
        if let Some(paragraph) = self.open_paragraphs.last_mut() {
            paragraph.buffer.push_str(&marker);
            paragraph.buffer.push_str(&open.deferred);
        }
    }

    /// The comment table lookup for a range boundary; `None` for orphans
    fn known_comment_id(&mut self, element: &BytesStart<'_>) -> Option<String> {
        match attribute(element, b"id") {
            Some(id) if !id.is_empty() && self.comments.contains_key(&id) => Some(id),
            _ => {
                // Definitions can be deleted independently of their anchors.
                // Such boundaries add nothing to the text and raise nothing.
                self.output.orphaned_comment_ranges += 1;
                None
            }
        }
    }

    fn comment_range_start(&mut self, element: &BytesStart<'_>) {
        if let Some(id) = self.known_comment_id(element) {
            self.push_marker(&comment_start_marker(&id));
        }
    }

    fn comment_range_end(&mut self, element: &BytesStart<'_>, paragraph_index: usize) {
        let Some(id) = self.known_comment_id(element) else {
            return;
        };
        if let Some(comment) = self.comments.get(&id) {
            self.output.comments.push(CommentReference {
                comment_id: id.clone(),
                paragraph_index,
                comment: comment.clone(),
            });
        }
        self.push_marker(&comment_end_marker(&id));
    }

    fn close_paragraph(&mut self) {
        let Some(paragraph) = self.open_paragraphs.pop() else {
            return;
        };

        let text = paragraph.buffer.trim();
        if !text.is_empty() {
            self.output.paragraphs.push(Paragraph {
                index: paragraph.index,
                text: text.to_string(),
            });
        }
    }
}

/// Walk the primary content part and annotate it against the comment table
pub(crate) fn annotate(document_xml: &[u8], comments: &CommentTable) -> Result<Annotation> {
    let mut reader = part_reader(document_xml);
    let mut buf = Vec::new();
    let mut context = WalkContext::new(comments);
    let mut structure = PartStructure::default();

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| Error::InvalidPrimaryPart(e.to_string()))?;
        structure.observe(&ns, &event).map_err(Error::InvalidPrimaryPart)?;

        match event {
            Event::Start(ref e) => {
                let kind = NodeKind::classify(&ns, e);
                context.start(kind, e);
            }
            Event::End(_) => context.end(),
            Event::Text(ref e) if context.in_text_leaf() => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::InvalidPrimaryPart(err.to_string()))?;
                context.text(&text);
            }
            Event::CData(ref e) if context.in_text_leaf() => {
                context.text(&String::from_utf8_lossy(e));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    structure.finish().map_err(Error::InvalidPrimaryPart)?;

    // Nested paragraphs close before their parent
    context.output.paragraphs.sort_by_key(|paragraph| paragraph.index);

    log::debug!(
        "Annotated {} paragraph elements, {} revisions, {} comment references",
        context.paragraph_counter,
        context.output.revisions.len(),
        context.output.comments.len()
    );

    Ok(context.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::Comment;

    const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn document(body: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W}"><w:body>{body}</w:body></w:document>"#
        )
        .into_bytes()
    }

    fn table(entries: &[(&str, &str, &str)]) -> CommentTable {
        entries
            .iter()
            .map(|(id, author, text)| {
                (
                    id.to_string(),
                    Comment {
                        id: id.to_string(),
                        author: author.to_string(),
                        date: String::new(),
                        text: text.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_plain_paragraph() {
        let xml = document(r#"<w:p><w:r><w:t>Hello world</w:t></w:r></w:p>"#);
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(
            result.paragraphs,
            vec![Paragraph {
                index: 1,
                text: "Hello world".to_string()
            }]
        );
        assert!(result.revisions.is_empty());
        assert!(result.comments.is_empty());
    }

    #[test]
    fn test_runs_concatenate_and_preserve_inner_spaces() {
        let xml = document(
            r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();
        assert_eq!(result.paragraphs[0].text, "Hello world");
    }

    #[test]
    fn test_insertion_marker_and_record() {
        let xml = document(
            r#"<w:p><w:r><w:t xml:space="preserve">Some </w:t></w:r><w:ins w:id="0" w:author="Alice" w:date="2024-11-05T10:30:00Z"><w:r><w:t>new</w:t></w:r></w:ins><w:r><w:t xml:space="preserve"> text</w:t></w:r></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(result.paragraphs[0].text, "Some [+INS:1]new[/INS] text");
        assert_eq!(
            result.revisions,
            vec![Revision {
                id: 1,
                kind: RevisionKind::Insertion,
                author: "Alice".to_string(),
                date: "2024-11-05T10:30:00Z".to_string(),
                text: "new".to_string(),
                paragraph_index: 1,
            }]
        );
    }

    #[test]
    fn test_deletion_uses_deleted_text() {
        let xml = document(
            r#"<w:p><w:del w:id="4" w:author="Jane"><w:r><w:delText>old</w:delText></w:r></w:del><w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(result.paragraphs[0].text, "[-DEL:1]old[/DEL]kept");
        assert_eq!(result.revisions[0].kind, RevisionKind::Deletion);
        assert_eq!(result.revisions[0].text, "old");
        assert_eq!(result.revisions[0].date, "");
    }

    #[test]
    fn test_revision_ids_shared_across_kinds_and_paragraphs() {
        let xml = document(
            r#"<w:p><w:del w:author="A"><w:r><w:delText>a</w:delText></w:r></w:del><w:ins w:author="B"><w:r><w:t>b</w:t></w:r></w:ins></w:p>
               <w:p><w:ins w:author="A"><w:r><w:t>c</w:t></w:r></w:ins><w:ins w:author="A"><w:r><w:t>d</w:t></w:r></w:ins></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        let ids: Vec<usize> = result.revisions.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(result.paragraphs[0].text, "[-DEL:1]a[/DEL][+INS:2]b[/INS]");
        // Adjacent insertions stay separate
        assert_eq!(result.paragraphs[1].text, "[+INS:3]c[/INS][+INS:4]d[/INS]");
        assert_eq!(result.revisions[2].paragraph_index, 2);
    }

    #[test]
    fn test_missing_author_defaults_to_unknown() {
        let xml = document(r#"<w:p><w:ins w:id="1"><w:r><w:t>x</w:t></w:r></w:ins></w:p>"#);
        let result = annotate(&xml, &CommentTable::new()).unwrap();
        assert_eq!(result.revisions[0].author, "Unknown");
    }

    #[test]
    fn test_comment_range_in_one_paragraph() {
        let xml = document(
            r#"<w:p><w:commentRangeStart w:id="c1"/><w:r><w:t>Review</w:t></w:r><w:commentRangeEnd w:id="c1"/><w:r><w:commentReference w:id="c1"/></w:r></w:p>"#,
        );
        let comments = table(&[("c1", "Bob", "fix this")]);
        let result = annotate(&xml, &comments).unwrap();

        assert_eq!(result.paragraphs[0].text, "[COMMENT:c1>>]Review[<<COMMENT:c1]");
        assert_eq!(result.comments.len(), 1);
        let reference = &result.comments[0];
        assert_eq!(reference.comment_id, "c1");
        assert_eq!(reference.paragraph_index, 1);
        assert_eq!(reference.author(), "Bob");
        assert_eq!(reference.comment.text, "fix this");
    }

    #[test]
    fn test_comment_spanning_paragraphs_binds_to_closing_paragraph() {
        let xml = document(
            r#"<w:p><w:commentRangeStart w:id="5"/><w:r><w:t>first</w:t></w:r></w:p>
               <w:p><w:r><w:t>second</w:t></w:r><w:commentRangeEnd w:id="5"/></w:p>"#,
        );
        let comments = table(&[("5", "Eve", "span")]);
        let result = annotate(&xml, &comments).unwrap();

        assert_eq!(result.paragraphs[0].text, "[COMMENT:5>>]first");
        assert_eq!(result.paragraphs[1].text, "second[<<COMMENT:5]");
        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.comments[0].paragraph_index, 2);
    }

    #[test]
    fn test_orphan_comment_range_is_silently_dropped() {
        let xml = document(
            r#"<w:p><w:commentRangeStart w:id="c99"/><w:r><w:t>text</w:t></w:r><w:commentRangeEnd w:id="c99"/></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(result.paragraphs[0].text, "text");
        assert!(result.comments.is_empty());
        assert_eq!(result.orphaned_comment_ranges, 2);
    }

    #[test]
    fn test_empty_paragraphs_consume_indices() {
        let xml = document(
            r#"<w:p/><w:p><w:r><w:t>   </w:t></w:r></w:p><w:p><w:ins w:author="Zed"><w:r><w:t>x</w:t></w:r></w:ins></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(
            result.paragraphs,
            vec![Paragraph {
                index: 3,
                text: "[+INS:1]x[/INS]".to_string()
            }]
        );
        assert_eq!(result.revisions[0].paragraph_index, 3);
    }

    #[test]
    fn test_orphan_only_paragraph_is_dropped() {
        let xml = document(
            r#"<w:p><w:commentRangeStart w:id="3"/><w:commentRangeEnd w:id="3"/></w:p><w:p><w:r><w:t>next</w:t></w:r></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(result.paragraphs.len(), 1);
        assert_eq!(result.paragraphs[0].index, 2);
    }

    #[test]
    fn test_nested_revision_gets_own_record_without_marker() {
        let xml = document(
            r#"<w:p><w:ins w:author="A"><w:del w:author="B"><w:r><w:delText>gone</w:delText></w:r></w:del></w:ins></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(result.revisions.len(), 2);
        assert_eq!(result.revisions[0].kind, RevisionKind::Insertion);
        assert_eq!(result.revisions[0].text, "gone");
        assert_eq!(result.revisions[1].kind, RevisionKind::Deletion);
        assert_eq!(result.revisions[1].text, "gone");
        assert_eq!(result.paragraphs[0].text, "[+INS:1]gone[/INS]");
    }

    #[test]
    fn test_comment_marker_inside_revision_follows_revision_marker() {
        let xml = document(
            r#"<w:p><w:ins w:author="A"><w:r><w:t>one</w:t></w:r><w:commentRangeEnd w:id="1"/><w:r><w:t>two</w:t></w:r></w:ins></w:p>"#,
        );
        let comments = table(&[("1", "C", "note")]);
        let result = annotate(&xml, &comments).unwrap();

        assert_eq!(result.paragraphs[0].text, "[+INS:1]onetwo[/INS][<<COMMENT:1]");
        assert_eq!(result.comments[0].paragraph_index, 1);
    }

    #[test]
    fn test_paragraph_mark_revision_is_counted() {
        let xml = document(
            r#"<w:p><w:pPr><w:rPr><w:ins w:id="9" w:author="Pat"/></w:rPr></w:pPr><w:r><w:t>body</w:t></w:r></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(result.revisions.len(), 1);
        assert_eq!(result.revisions[0].text, "");
        assert_eq!(result.paragraphs[0].text, "[+INS:1][/INS]body");
    }

    #[test]
    fn test_nested_paragraph_owns_its_text() {
        let xml = document(
            r#"<w:p><w:r><w:t>outer</w:t></w:r><w:r><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></w:r><w:r><w:t> end</w:t></w:r></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert_eq!(
            result.paragraphs,
            vec![
                Paragraph {
                    index: 1,
                    text: "outer end".to_string()
                },
                Paragraph {
                    index: 2,
                    text: "inner".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_revisions_outside_paragraphs_are_ignored() {
        let xml = document(
            r#"<w:tbl><w:tr><w:trPr><w:ins w:author="T"/></w:trPr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();

        assert!(result.revisions.is_empty());
        assert_eq!(result.paragraphs[0].text, "cell");
    }

    #[test]
    fn test_other_namespaces_are_not_text() {
        let xml = document(
            r#"<w:p xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><w:r><w:t>seen</w:t><a:t>hidden</a:t></w:r></w:p>"#,
        );
        let result = annotate(&xml, &CommentTable::new()).unwrap();
        assert_eq!(result.paragraphs[0].text, "seen");
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let xml = document(r#"<w:p><w:r><w:t>Fish &amp; chips &lt;3</w:t></w:r></w:p>"#);
        let result = annotate(&xml, &CommentTable::new()).unwrap();
        assert_eq!(result.paragraphs[0].text, "Fish & chips <3");
    }

    #[test]
    fn test_mismatched_tags_are_fatal() {
        let xml = document(r#"<w:p><w:r><w:t>broken</w:r></w:p>"#);
        let result = annotate(&xml, &CommentTable::new());
        assert!(matches!(result, Err(Error::InvalidPrimaryPart(_))));
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let xml = format!(r#"<w:document xmlns:w="{W}"><w:body><w:p><w:r><w:t>cut"#);
        let result = annotate(xml.as_bytes(), &CommentTable::new());
        assert!(matches!(result, Err(Error::InvalidPrimaryPart(_))));
    }

    #[test]
    fn test_empty_part_is_fatal() {
        let result = annotate(b"", &CommentTable::new());
        assert!(matches!(result, Err(Error::InvalidPrimaryPart(_))));
    }

    #[test]
    fn test_undeclared_prefix_is_fatal() {
        let xml = br#"<w:document><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#;
        match annotate(xml, &CommentTable::new()) {
            Err(Error::InvalidPrimaryPart(message)) => {
                assert!(message.contains("unbound namespace prefix"), "{message}")
            }
            other => panic!("expected a malformed part error, got {other:?}"),
        }
    }

    #[test]
    fn test_second_root_element_is_fatal() {
        let mut xml = document(r#"<w:p><w:r><w:t>A</w:t></w:r></w:p>"#);
        xml.extend(document(r#"<w:p><w:r><w:t>B</w:t></w:r></w:p>"#));
        let result = annotate(&xml, &CommentTable::new());
        assert!(matches!(result, Err(Error::InvalidPrimaryPart(_))));
    }

    #[test]
    fn test_text_after_root_is_fatal() {
        let mut xml = document(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#);
        xml.extend_from_slice(b"garbage");
        let result = annotate(&xml, &CommentTable::new());
        assert!(matches!(result, Err(Error::InvalidPrimaryPart(_))));
    }

    #[test]
    fn test_trailing_whitespace_after_root_is_allowed() {
        let mut xml = document(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#);
        xml.extend_from_slice(b"\r\n");
        let result = annotate(&xml, &CommentTable::new()).unwrap();
        assert_eq!(result.paragraphs[0].text, "Hello");
    }

    #[test]
    fn test_fresh_context_per_call() {
        let xml = document(r#"<w:p><w:ins w:author="A"><w:r><w:t>x</w:t></w:r></w:ins></w:p>"#);
        let first = annotate(&xml, &CommentTable::new()).unwrap();
        let second = annotate(&xml, &CommentTable::new()).unwrap();
        assert_eq!(first.revisions, second.revisions);
        assert_eq!(second.revisions[0].id, 1);
    }
}
