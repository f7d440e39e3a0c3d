//! Line-oriented INI parser.
//!
//! The parser keeps a buffer of pending comment lines and attaches it to the
//! next section header or entry it meets. Blank lines are dropped. Entries
//! that appear before the first header form a header-less preamble. Comment
//! lines left over at the end of the input are returned separately so the
//! document can write them back after the last section.

use std::collections::HashSet;

use crate::error::{IniError, Result};
use crate::models::{Entry, Section};

/// Output of [`parse_str`]: entries before the first header, sections in
/// source order, and any comments that followed the last entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub preamble: Vec<Entry>,
    pub sections: Vec<Section>,
    pub trailing_comments: Vec<String>,
}

/// Classification of a single source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Comment(&'a str),
    Header(&'a str),
    Entry { key: &'a str, value: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFault {
    UnterminatedHeader,
    MissingSeparator,
}

/// Classify one line (without its line terminator).
///
/// Keys lose surrounding whitespace; values lose only the whitespace directly
/// after `=`, so interior and trailing whitespace survive.
pub fn classify_line(raw: &str) -> std::result::Result<Line<'_>, LineFault> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }
    if let Some(comment) = trimmed.strip_prefix(';') {
        return Ok(Line::Comment(comment));
    }
    if let Some(rest) = trimmed.strip_prefix('[') {
        return rest
            .strip_suffix(']')
            .map(Line::Header)
            .ok_or(LineFault::UnterminatedHeader);
    }

    let line = raw.trim_start();
    let (key, value) = line.split_once('=').ok_or(LineFault::MissingSeparator)?;
    Ok(Line::Entry {
        key: key.trim_end(),
        value: value.trim_start(),
    })
}

/// Split text into lines, accepting `\n`, `\r\n` and bare `\r` terminators
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(['\r', '\n']) {
            Some(pos) => {
                let terminator_len = if current[pos..].starts_with("\r\n") { 2 } else { 1 };
                let next = &current[pos + terminator_len..];
                rest = if next.is_empty() { None } else { Some(next) };
                Some(&current[..pos])
            }
            None => {
                rest = None;
                if current.is_empty() { None } else { Some(current) }
            }
        }
    })
}

/// Parse a whole document. `source_name` is only used in error messages.
///
/// Either the full document is returned or the first malformed line is
/// reported; nothing partial escapes. A leading UTF-8 byte order mark is
/// skipped.
pub fn parse_str(text: &str, source_name: &str) -> Result<Parsed> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut preamble: Vec<Entry> = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut pending_comments: Vec<String> = Vec::new();
    let mut seen_names: HashSet<&str> = HashSet::new();

    for (idx, raw) in split_lines(text).enumerate() {
        let line_number = idx + 1;
        let line = classify_line(raw).map_err(|fault| match fault {
            LineFault::UnterminatedHeader => IniError::InvalidSectionHeader {
                line_number,
                line: raw.trim().to_string(),
                source_name: source_name.to_string(),
            },
            LineFault::MissingSeparator => IniError::MissingSeparator {
                line_number,
                line: raw.trim().to_string(),
                source_name: source_name.to_string(),
            },
        })?;

        match line {
            Line::Blank => {}
            Line::Comment(comment) => pending_comments.push(comment.to_string()),
            Line::Header(name) => {
                if !seen_names.insert(name) {
                    log::warn!(
                        "Duplicate section [{name}] on line {line_number} of {source_name}; the later one wins lookups"
                    );
                }
                sections.push(Section::with_comments(
                    name,
                    std::mem::take(&mut pending_comments),
                ));
            }
            Line::Entry { key, value } => {
                let entry =
                    Entry::with_comments(key, value, std::mem::take(&mut pending_comments));
                let Some(section) = sections.last_mut() else {
                    log::debug!(
                        "Key {key} on line {line_number} of {source_name} precedes any section header"
                    );
                    preamble.push(entry);
                    continue;
                };
                if section.push(entry) {
                    log::warn!(
                        "Duplicate key {key} in [{}] on line {line_number} of {source_name}; the later one wins lookups",
                        section.name()
                    );
                }
            }
        }
    }

    Ok(Parsed {
        preamble,
        sections,
        trailing_comments: pending_comments,
    })
}
