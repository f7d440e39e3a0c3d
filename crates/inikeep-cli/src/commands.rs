use anyhow::{Context, Result, bail};
use inikeep_engine::{IniDocument, Storage};
use std::io::Write;
use std::path::Path;

use crate::args::{Command, ValueType};

/// Run one subcommand against an open document, printing results to `out`
pub fn execute<S: Storage, W: Write>(
    doc: &mut IniDocument<S>,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Sections => {
            for name in doc.sections() {
                writeln!(out, "{name}")?;
            }
        }
        Command::Keys { section, values } => {
            if values {
                for (key, value) in doc.pairs(&section)? {
                    writeln!(out, "{key}={value}")?;
                }
            } else {
                for key in doc.keys(&section)? {
                    writeln!(out, "{key}")?;
                }
            }
        }
        Command::Get {
            section,
            key,
            default,
            value_type,
        } => {
            let text = match default {
                Some(default) => read_or(doc, &section, &key, &default, value_type)?,
                None => read(doc, &section, &key, value_type)?,
            };
            writeln!(out, "{text}")?;
        }
        Command::Set {
            section,
            key,
            value,
            value_type,
        } => write(doc, &section, &key, &value, value_type)?,
        Command::DeleteKey { section, key } => doc.delete_key(&section, &key)?,
        Command::DeleteSection { section } => doc.delete_section(&section)?,
        Command::EraseSection { section } => doc.erase_section(&section)?,
        Command::Clear => doc.clear_all()?,
        Command::Show => write!(out, "{doc}")?,
        Command::Merge { other } => {
            let copied = merge(doc, &other)?;
            log::info!("Merged {copied} entries from {}", other.display());
        }
    }
    Ok(())
}

fn read<S: Storage>(
    doc: &IniDocument<S>,
    section: &str,
    key: &str,
    value_type: ValueType,
) -> Result<String> {
    Ok(match value_type {
        ValueType::String => doc.read_string(section, key)?,
        ValueType::Int => doc.read_int(section, key)?.to_string(),
        ValueType::Float => doc.read_float(section, key)?.to_string(),
        ValueType::Bool => doc.read_bool(section, key)?.to_string(),
    })
}

fn read_or<S: Storage>(
    doc: &IniDocument<S>,
    section: &str,
    key: &str,
    default: &str,
    value_type: ValueType,
) -> Result<String> {
    Ok(match value_type {
        ValueType::String => doc.read_string_or(section, key, default),
        ValueType::Int => doc
            .read_int_or(section, key, parse_int(default)?)
            .to_string(),
        ValueType::Float => doc
            .read_float_or(section, key, parse_float(default)?)
            .to_string(),
        ValueType::Bool => doc
            .read_bool_or(section, key, parse_bool(default)?)
            .to_string(),
    })
}

fn write<S: Storage>(
    doc: &mut IniDocument<S>,
    section: &str,
    key: &str,
    value: &str,
    value_type: ValueType,
) -> Result<()> {
    match value_type {
        ValueType::String => doc.write_string(section, key, value)?,
        ValueType::Int => doc.write_int(section, key, parse_int(value)?)?,
        ValueType::Float => doc.write_float(section, key, parse_float(value)?)?,
        ValueType::Bool => doc.write_bool(section, key, parse_bool(value)?)?,
    }
    Ok(())
}

/// Copy all entries of `other` into `doc` inside one batch.
///
/// Every record of a duplicated section is copied in order, so later values
/// win. Entries above the first header of `other` have no section to land in
/// and are skipped.
fn merge<S: Storage>(doc: &mut IniDocument<S>, other: &Path) -> Result<usize> {
    let source = IniDocument::open_strict(other)
        .with_context(|| format!("Failed to open {}", other.display()))?;
    if !source.preamble().is_empty() {
        log::warn!(
            "Skipping {} entries above the first section of {}",
            source.preamble().len(),
            other.display()
        );
    }

    let mut batch = doc.begin_batch();
    let mut copied = 0;
    for section in source.iter() {
        for entry in section.entries() {
            batch.write_string(section.name(), entry.key(), entry.value())?;
            copied += 1;
        }
    }
    batch.finish()?;
    Ok(copied)
}

// Command-line input is checked strictly, unlike values already in a file
fn parse_int(text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .with_context(|| format!("Not an integer: {text}"))
}

fn parse_float(text: &str) -> Result<f64> {
    text.trim()
        .parse()
        .with_context(|| format!("Not a number: {text}"))
}

fn parse_bool(text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("Not a boolean: {text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inikeep_engine::{ErrorKind, IniError, LoadMode, MemoryStorage};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "; demo\n[window]\nwidth=640\nfullscreen=0\n\n[user]\nname=Ada\n";

    fn run(doc: &mut IniDocument<MemoryStorage>, command: Command) -> Result<String> {
        let mut out = Vec::new();
        execute(doc, command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn sample() -> (IniDocument<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::with_contents(SAMPLE);
        let doc = IniDocument::load(storage.clone(), LoadMode::Strict).unwrap();
        (doc, storage)
    }

    #[test]
    fn test_sections_and_keys() {
        let (mut doc, _storage) = sample();

        assert_eq!(run(&mut doc, Command::Sections).unwrap(), "window\nuser\n");
        assert_eq!(
            run(
                &mut doc,
                Command::Keys {
                    section: "window".to_string(),
                    values: false,
                }
            )
            .unwrap(),
            "width\nfullscreen\n"
        );
        assert_eq!(
            run(
                &mut doc,
                Command::Keys {
                    section: "window".to_string(),
                    values: true,
                }
            )
            .unwrap(),
            "width=640\nfullscreen=0\n"
        );
    }

    #[test]
    fn test_get_typed_and_defaulted() {
        let (mut doc, _storage) = sample();
        let get = |key: &str, default: Option<&str>, value_type| Command::Get {
            section: "window".to_string(),
            key: key.to_string(),
            default: default.map(str::to_string),
            value_type,
        };

        assert_eq!(run(&mut doc, get("width", None, ValueType::Int)).unwrap(), "640\n");
        assert_eq!(
            run(&mut doc, get("fullscreen", None, ValueType::Bool)).unwrap(),
            "false\n"
        );
        assert_eq!(
            run(&mut doc, get("height", Some("480"), ValueType::Int)).unwrap(),
            "480\n"
        );

        let err = run(&mut doc, get("height", None, ValueType::String)).unwrap_err();
        let ini_err = err.downcast_ref::<IniError>().unwrap();
        assert_eq!(ini_err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_set_saves_typed_value() {
        let (mut doc, storage) = sample();

        run(
            &mut doc,
            Command::Set {
                section: "window".to_string(),
                key: "fullscreen".to_string(),
                value: "true".to_string(),
                value_type: ValueType::Bool,
            },
        )
        .unwrap();

        assert_eq!(storage.save_count(), 1);
        assert_eq!(doc.read_string("window", "fullscreen").unwrap(), "1");
    }

    #[test]
    fn test_set_rejects_bad_number() {
        let (mut doc, storage) = sample();

        let err = run(
            &mut doc,
            Command::Set {
                section: "window".to_string(),
                key: "width".to_string(),
                value: "wide".to_string(),
                value_type: ValueType::Int,
            },
        )
        .unwrap_err();

        assert!(err.to_string().contains("Not an integer"));
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_structural_commands() {
        let (mut doc, storage) = sample();

        run(
            &mut doc,
            Command::DeleteKey {
                section: "window".to_string(),
                key: "fullscreen".to_string(),
            },
        )
        .unwrap();
        run(
            &mut doc,
            Command::EraseSection {
                section: "user".to_string(),
            },
        )
        .unwrap();
        assert_eq!(
            storage.contents().unwrap(),
            "; demo\n[window]\nwidth=640\n\n[user]\n"
        );

        run(
            &mut doc,
            Command::DeleteSection {
                section: "user".to_string(),
            },
        )
        .unwrap();
        assert_eq!(run(&mut doc, Command::Show).unwrap(), "; demo\n[window]\nwidth=640\n");

        run(&mut doc, Command::Clear).unwrap();
        assert_eq!(storage.contents().as_deref(), Some(""));
    }

    #[test]
    fn test_merge_saves_once() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.ini");
        std::fs::write(&other, "[window]\nwidth=1024\nheight=768\n[theme]\nname=dark\n").unwrap();
        let (mut doc, storage) = sample();

        run(&mut doc, Command::Merge { other }).unwrap();

        assert_eq!(storage.save_count(), 1);
        assert_eq!(doc.read_int("window", "width").unwrap(), 1024);
        assert_eq!(doc.read_int("window", "height").unwrap(), 768);
        assert_eq!(doc.read_string("theme", "name").unwrap(), "dark");
    }

    #[test]
    fn test_merge_copies_every_duplicate_section() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("dups.ini");
        std::fs::write(
            &other,
            "top=skipped\n[extra]\na=1\nshared=first\n[extra]\nb=2\nshared=second\n",
        )
        .unwrap();
        let (mut doc, storage) = sample();

        let copied = merge(&mut doc, &other).unwrap();

        assert_eq!(copied, 4);
        assert_eq!(storage.save_count(), 1);
        assert_eq!(
            doc.pairs("extra").unwrap(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("shared".to_string(), "second".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
        assert!(doc.preamble().is_empty());
    }

    #[test]
    fn test_merge_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, storage) = sample();

        let err = run(
            &mut doc,
            Command::Merge {
                other: dir.path().join("absent.ini"),
            },
        )
        .unwrap_err();

        assert!(err.to_string().contains("absent.ini"));
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_parse_bool_words() {
        assert!(parse_bool("Yes").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
