#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::PathBuf;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// `word/document.xml` with the given body content
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

/// `word/comments.xml` with the given comment elements
pub fn comments_xml(comments: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:comments xmlns:w="{W}">{comments}</w:comments>"#
    )
}

pub fn comment(id: &str, author: &str, text: &str) -> String {
    format!(
        r#"<w:comment w:id="{id}" w:author="{author}" w:date="2024-05-01T12:00:00Z"><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:comment>"#
    )
}

/// Zip the given parts into an in-memory package
pub fn build_package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    for (name, content) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A package with a document body and optional comments
pub fn build_docx(body: &str, comments: Option<&str>) -> Vec<u8> {
    let document = document_xml(body);
    match comments {
        Some(comments) => {
            let comments = comments_xml(comments);
            build_package(&[
                ("word/document.xml", &document),
                ("word/comments.xml", &comments),
            ])
        }
        None => build_package(&[("word/document.xml", &document)]),
    }
}

/// Write bytes to a temporary `.docx` file, returning the directory guard and path
pub fn write_temp_docx(bytes: &[u8], name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}
