//! Serialiser: the inverse of [`crate::parsing::parse_str`].

use crate::models::{Entry, Section};

/// Render a document as INI text.
///
/// Header-less preamble entries come first. One blank line separates the
/// preamble and each section from the next, comments are written as `;` plus
/// their stored text, and every line ends with `\n`. Comments that followed
/// the last entry in the source come last.
pub fn render(preamble: &[Entry], sections: &[Section], trailing_comments: &[String]) -> String {
    let mut out = String::new();
    push_entries(&mut out, preamble);

    for (i, section) in sections.iter().enumerate() {
        if i > 0 || !preamble.is_empty() {
            out.push('\n');
        }
        push_comments(&mut out, section.comments());
        out.push('[');
        out.push_str(section.name());
        out.push_str("]\n");
        push_entries(&mut out, section.entries());
    }

    push_comments(&mut out, trailing_comments);
    out
}

fn push_entries(out: &mut String, entries: &[Entry]) {
    for entry in entries {
        push_comments(out, entry.comments());
        out.push_str(entry.key());
        out.push('=');
        out.push_str(entry.value());
        out.push('\n');
    }
}

fn push_comments(out: &mut String, comments: &[String]) {
    for comment in comments {
        out.push(';');
        out.push_str(comment);
        out.push('\n');
    }
}
