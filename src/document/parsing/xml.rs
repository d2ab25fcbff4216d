//! Shared WordprocessingML reading helpers
//!
//! Both part parsers read with a namespace-aware reader so that elements are
//! matched by namespace URI rather than by whatever prefix the producer chose.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// Transitional WordprocessingML namespace (what Word writes)
const WORDML_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Strict WordprocessingML namespace
const WORDML_STRICT_NS: &[u8] = b"http://purl.oclc.org/ooxml/wordprocessingml/main";

/// Reader configured for part traversal
///
/// Empty elements are expanded into start/end pairs so every element is seen
/// exactly twice, and text is never trimmed.
pub(crate) fn part_reader(bytes: &[u8]) -> NsReader<&[u8]> {
    let mut reader = NsReader::from_reader(bytes);
    let config = reader.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = true;
    config.check_end_names = true;
    reader
}

pub(crate) fn is_wordml(ns: &ResolveResult<'_>) -> bool {
    matches!(
        ns,
        ResolveResult::Bound(Namespace(uri)) if *uri == WORDML_NS || *uri == WORDML_STRICT_NS
    )
}

/// Document-level well-formedness checks the reader leaves to the caller
///
/// The reader already rejects mismatched end tags. This tracks what it does
/// not: a single root element, no character data outside it, and no element
/// with an undeclared namespace prefix.
#[derive(Debug, Default)]
pub(crate) struct PartStructure {
    depth: usize,
    root_closed: bool,
}

impl PartStructure {
    pub(crate) fn observe(
        &mut self,
        ns: &ResolveResult<'_>,
        event: &Event<'_>,
    ) -> Result<(), String> {
        match event {
            Event::Start(e) => {
                if let ResolveResult::Unknown(prefix) = ns {
                    return Err(format!(
                        "unbound namespace prefix '{}' on element '{}'",
                        String::from_utf8_lossy(prefix),
                        String::from_utf8_lossy(e.name().as_ref())
                    ));
                }
                if self.depth == 0 && self.root_closed {
                    return Err("more than one root element".to_string());
                }
                self.depth += 1;
            }
            Event::End(_) => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    self.root_closed = true;
                }
            }
            Event::Text(e) if self.depth == 0 => {
                if !e.iter().all(|&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')) {
                    return Err("text outside the root element".to_string());
                }
            }
            Event::CData(_) if self.depth == 0 => {
                return Err("text outside the root element".to_string());
            }
            _ => {}
        }
        Ok(())
    }

    /// Checks once the reader reports end of input
    pub(crate) fn finish(&self) -> Result<(), String> {
        if self.depth > 0 {
            Err("unexpected end of document".to_string())
        } else if !self.root_closed {
            Err("no root element".to_string())
        } else {
            Ok(())
        }
    }
}

/// Look up an attribute by local name, ignoring its prefix
pub(crate) fn attribute(element: &BytesStart<'_>, local_name: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local_name)
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.into_owned()))
}
