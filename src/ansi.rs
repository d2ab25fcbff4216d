use anyhow::Result;
use crossterm::style::{
    Attribute, Color as CrosstermColor, ResetColor, SetAttribute, SetForegroundColor,
};
use std::fmt::Write;

use crate::document::markers::{segments, Segment};
use crate::document::*;
use crate::ColorDepth;

const INSERTION_COLOR: &str = "#00C853"; // Green
const DELETION_COLOR: &str = "#FF5252"; // Red
const COMMENT_COLOR: &str = "#FFD700"; // Gold/Yellow
const HEADING_COLOR: &str = "#6495ED"; // Cornflower Blue
const MUTED_COLOR: &str = "#808080"; // Gray

pub struct AnsiOptions {
    pub terminal_width: usize,
    pub color_depth: ColorDepth,
}

impl Default for AnsiOptions {
    fn default() -> Self {
        Self {
            terminal_width: std::env::var("COLUMNS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(80),
            color_depth: ColorDepth::Auto,
        }
    }
}

pub fn export_to_ansi_with_options(
    result: &ExtractionResult,
    options: &AnsiOptions,
) -> Result<String> {
    let mut output = String::new();
    let summary = &result.summary;

    write_ansi_heading(&mut output, &result.file, options)?;
    output.push('\n');

    writeln!(output, "- Paragraphs: {}", summary.total_paragraphs)?;
    writeln!(
        output,
        "- Tracked changes: {} ({}{} insertions{}, {}{} deletions{})",
        summary.tracked_changes,
        format_ansi_color(Some(INSERTION_COLOR), options),
        summary.insertions,
        format_ansi_reset(),
        format_ansi_color(Some(DELETION_COLOR), options),
        summary.deletions,
        format_ansi_reset()
    )?;
    writeln!(output, "- Comments: {}", summary.comments)?;
    if !summary.authors.is_empty() {
        let authors: Vec<&str> = summary.authors.iter().map(String::as_str).collect();
        writeln!(output, "- Authors: {}", authors.join(", "))?;
    }
    output.push('\n');

    // Separator
    let separator = "=".repeat(std::cmp::min(50, options.terminal_width));
    writeln!(output, "{separator}")?;
    output.push('\n');

    for paragraph in &result.paragraphs {
        write_ansi_paragraph(&mut output, paragraph, options)?;
    }

    if !result.revisions.is_empty() {
        output.push('\n');
        write_ansi_heading(&mut output, "Tracked changes", options)?;
        for revision in &result.revisions {
            writeln!(
                output,
                "{}{}{} {} by {} (paragraph {}): \"{}\"",
                format_ansi_color(Some(revision_color(revision.kind)), options),
                revision_tag(revision.kind, revision.id),
                format_ansi_reset(),
                revision.kind,
                revision.author,
                revision.paragraph_index,
                revision.text
            )?;
        }
    }

    if !result.comments.is_empty() {
        output.push('\n');
        write_ansi_heading(&mut output, "Comments", options)?;
        for reference in &result.comments {
            writeln!(
                output,
                "{}[{}]{} {} (paragraph {}): {}",
                format_ansi_color(Some(COMMENT_COLOR), options),
                reference.comment_id,
                format_ansi_reset(),
                reference.author(),
                reference.paragraph_index,
                reference.comment.text
            )?;
        }
    }

    Ok(output)
}

fn write_ansi_heading(output: &mut String, text: &str, options: &AnsiOptions) -> Result<()> {
    let formatted_text = format_ansi_text(
        &format!("■ {text}"),
        true,
        false,
        false,
        Some(HEADING_COLOR),
        options,
    );
    writeln!(output, "{}{}", formatted_text, format_ansi_reset())?;
    Ok(())
}

fn write_ansi_paragraph(
    output: &mut String,
    paragraph: &Paragraph,
    options: &AnsiOptions,
) -> Result<()> {
    write!(
        output,
        "{}{:>4}{} ",
        format_ansi_color(Some(MUTED_COLOR), options),
        paragraph.index,
        format_ansi_reset()
    )?;

    for segment in segments(&paragraph.text) {
        write!(output, "{}", format_ansi_segment(&segment, options))?;
    }
    write!(output, "{}", format_ansi_reset())?;
    writeln!(output)?;
    Ok(())
}

fn format_ansi_segment(segment: &Segment<'_>, options: &AnsiOptions) -> String {
    match *segment {
        Segment::Text(text) => text.to_string(),
        Segment::Revision { kind, id, text } => {
            let color = Some(revision_color(kind));
            let tag = format_ansi_text(&revision_tag(kind, id), true, false, false, color, options);
            let inserted = kind == RevisionKind::Insertion;
            let body = format_ansi_text(text, false, inserted, !inserted, color, options);
            format!("{tag}{body}")
        }
        Segment::CommentStart(id) => {
            let anchor = format!("⟦{id}:");
            format_ansi_text(&anchor, true, false, false, Some(COMMENT_COLOR), options)
        }
        Segment::CommentEnd(id) => {
            let anchor = format!(":{id}⟧");
            format_ansi_text(&anchor, true, false, false, Some(COMMENT_COLOR), options)
        }
    }
}

fn revision_color(kind: RevisionKind) -> &'static str {
    match kind {
        RevisionKind::Insertion => INSERTION_COLOR,
        RevisionKind::Deletion => DELETION_COLOR,
    }
}

/// Short label tying an inline span to its tracked change record
fn revision_tag(kind: RevisionKind, id: usize) -> String {
    match kind {
        RevisionKind::Insertion => format!("⟦+{id}⟧"),
        RevisionKind::Deletion => format!("⟦-{id}⟧"),
    }
}

fn format_ansi_text(
    text: &str,
    bold: bool,
    underline: bool,
    strikethrough: bool,
    color: Option<&str>,
    options: &AnsiOptions,
) -> String {
    let mut result = String::new();

    if bold {
        result.push_str(&format!("{}", SetAttribute(Attribute::Bold)));
    }
    if underline {
        result.push_str(&format!("{}", SetAttribute(Attribute::Underlined)));
    }
    if strikethrough {
        result.push_str(&format!("{}", SetAttribute(Attribute::CrossedOut)));
    }

    if let Some(color_hex) = color {
        result.push_str(&format_ansi_color(Some(color_hex), options));
    }

    result.push_str(text);

    // Reset after every span so attributes do not bleed into plain text
    result.push_str(&format!("{}", SetAttribute(Attribute::Reset)));
    result.push_str(&format_ansi_reset());

    result
}

fn format_ansi_color(color_hex: Option<&str>, options: &AnsiOptions) -> String {
    let Some(hex) = color_hex else {
        return String::new();
    };

    match convert_hex_to_crossterm_color(hex, &options.color_depth) {
        Some(color) => format!("{}", SetForegroundColor(color)),
        None => String::new(),
    }
}

fn format_ansi_reset() -> String {
    format!("{ResetColor}")
}

fn convert_hex_to_crossterm_color(hex: &str, color_depth: &ColorDepth) -> Option<CrosstermColor> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    match color_depth {
        ColorDepth::Monochrome => None,
        ColorDepth::Standard => Some(CrosstermColor::AnsiValue(rgb_to_ansi_16(r, g, b))),
        ColorDepth::Extended => Some(CrosstermColor::AnsiValue(rgb_to_ansi_256(r, g, b))),
        ColorDepth::TrueColor | ColorDepth::Auto => Some(CrosstermColor::Rgb { r, g, b }),
    }
}

fn rgb_to_ansi_16(r: u8, g: u8, b: u8) -> u8 {
    let base = match (r > 64, g > 64, b > 64) {
        (false, false, false) => 0, // Black
        (false, false, true) => 4,  // Blue
        (false, true, false) => 2,  // Green
        (false, true, true) => 6,   // Cyan
        (true, false, false) => 1,  // Red
        (true, false, true) => 5,   // Magenta
        (true, true, false) => 3,   // Yellow
        (true, true, true) => 7,    // White
    };

    if r > 127 || g > 127 || b > 127 {
        base + 8
    } else {
        base
    }
}

fn rgb_to_ansi_256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        // Grayscale ramp
        if r < 8 {
            16
        } else if r > 247 {
            231
        } else {
            232 + (r - 8) / 10
        }
    } else {
        // Color cube: 16 + 36*r + 6*g + b
        let r_index = (r as f32 / 255.0 * 5.0) as u8;
        let g_index = (g as f32 / 255.0 * 5.0) as u8;
        let b_index = (b as f32 / 255.0 * 5.0) as u8;
        16 + 36 * r_index + 6 * g_index + b_index
    }
}
