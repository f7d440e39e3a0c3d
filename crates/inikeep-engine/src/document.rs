//! The mutable INI document and its save protocol.
//!
//! Every mutation marks the document dirty. Outside a batch the document is
//! written back immediately; inside one ([`IniDocument::begin_update`] /
//! [`IniDocument::end_update`], nestable) saves are held back until the
//! outermost batch closes, which always saves. A document that is still dirty
//! when dropped saves once more.
//!
//! Reads take `&self` and mutations `&mut self`; to share a document between
//! threads wrap it in a `Mutex`. Only one document should be live per storage
//! location: nothing guards against another writer changing the file.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::convert::IniValue;
use crate::error::{IniError, Result};
use crate::models::{Entry, Section};
use crate::parsing::{Parsed, parse_str};
use crate::render::render;
use crate::storage::{FileStorage, Storage};

/// What to do when the storage location does not exist at load time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Start with an empty document
    #[default]
    Lenient,
    /// Fail with [`IniError::StorageNotFound`]
    Strict,
}

pub struct IniDocument<S: Storage = FileStorage> {
    storage: S,
    mode: LoadMode,
    /// Entries above the first section header; read-only
    preamble: Vec<Entry>,
    sections: Vec<Section>,
    /// Section name -> position of its last occurrence in `sections`
    index: HashMap<String, usize>,
    trailing_comments: Vec<String>,
    dirty: bool,
    batch_depth: usize,
}

impl IniDocument<FileStorage> {
    /// Open a file, starting empty if it does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(FileStorage::new(path), LoadMode::Lenient)
    }

    /// Open a file that must already exist
    pub fn open_strict<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(FileStorage::new(path), LoadMode::Strict)
    }
}

impl<S: Storage> IniDocument<S> {
    pub fn load(storage: S, mode: LoadMode) -> Result<Self> {
        let parsed = read_parsed(&storage, mode)?;
        let mut doc = Self {
            storage,
            mode,
            preamble: Vec::new(),
            sections: Vec::new(),
            index: HashMap::new(),
            trailing_comments: Vec::new(),
            dirty: false,
            batch_depth: 0,
        };
        doc.install(parsed);
        log::debug!(
            "Loaded {} sections from {}",
            doc.sections.len(),
            doc.storage.name()
        );
        Ok(doc)
    }

    /// Re-read the storage, discarding unsaved changes.
    ///
    /// On error the current content is left as it was.
    pub fn reload(&mut self) -> Result<()> {
        let parsed = read_parsed(&self.storage, self.mode)?;
        self.install(parsed);
        self.dirty = false;
        log::debug!(
            "Reloaded {} sections from {}",
            self.sections.len(),
            self.storage.name()
        );
        Ok(())
    }

    /// Write the document to storage now, whatever the batch state
    pub fn save(&mut self) -> Result<()> {
        let text = self.to_ini_string();
        self.storage
            .write(&text)
            .map_err(|source| IniError::Storage {
                source_name: self.storage.name().to_string(),
                source,
            })?;
        self.dirty = false;
        log::debug!(
            "Saved {} sections ({} bytes) to {}",
            self.sections.len(),
            text.len(),
            self.storage.name()
        );
        Ok(())
    }

    pub fn begin_update(&mut self) {
        self.batch_depth += 1;
    }

    /// Close one batch level. Closing the outermost level saves.
    pub fn end_update(&mut self) -> Result<()> {
        if self.batch_depth == 0 {
            return Err(IniError::EndUpdateWithoutBegin {
                source_name: self.source_name().to_string(),
            });
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.save()?;
        }
        Ok(())
    }

    /// Open a batch that is closed when the guard is dropped or finished
    pub fn begin_batch(&mut self) -> UpdateGuard<'_, S> {
        self.begin_update();
        UpdateGuard {
            doc: self,
            finished: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn batch_depth(&self) -> usize {
        self.batch_depth
    }

    pub fn source_name(&self) -> &str {
        self.storage.name()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of sections, duplicates included
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn to_ini_string(&self) -> String {
        render(&self.preamble, &self.sections, &self.trailing_comments)
    }

    // Read path

    pub fn section_exists(&self, section: &str) -> bool {
        self.index.contains_key(section)
    }

    pub fn key_exists(&self, section: &str, key: &str) -> bool {
        self.section(section)
            .is_some_and(|found| found.contains_key(key))
    }

    pub fn section(&self, section: &str) -> Option<&Section> {
        self.index.get(section).map(|&pos| &self.sections[pos])
    }

    /// Section records in document order, duplicates included
    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Entries that appear before the first section header.
    ///
    /// They are kept and written back in place but cannot be addressed by the
    /// section/key operations.
    pub fn preamble(&self) -> &[Entry] {
        &self.preamble
    }

    /// All section names in document order
    pub fn sections(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|section| section.name().to_string())
            .collect()
    }

    /// Keys of a section in document order
    pub fn keys(&self, section: &str) -> Result<Vec<String>> {
        let found = self.require_section(section)?;
        Ok(found.keys().map(str::to_string).collect())
    }

    /// Key/value pairs of a section in document order
    pub fn pairs(&self, section: &str) -> Result<Vec<(String, String)>> {
        let found = self.require_section(section)?;
        Ok(found
            .entries()
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().to_string()))
            .collect())
    }

    pub fn section_comments(&self, section: &str) -> Result<&[String]> {
        Ok(self.require_section(section)?.comments())
    }

    pub fn key_comments(&self, section: &str, key: &str) -> Result<&[String]> {
        Ok(self.require_entry(section, key)?.comments())
    }

    /// Comments after the last entry of the document
    pub fn trailing_comments(&self) -> &[String] {
        &self.trailing_comments
    }

    /// Typed read of a value that must exist
    pub fn read<T: IniValue>(&self, section: &str, key: &str) -> Result<T> {
        Ok(T::from_raw(self.require_entry(section, key)?.value()))
    }

    /// Typed read falling back to `default` when the section or key is missing
    pub fn read_or<T: IniValue>(&self, section: &str, key: &str, default: T) -> T {
        self.try_read(section, key).unwrap_or(default)
    }

    pub fn try_read<T: IniValue>(&self, section: &str, key: &str) -> Option<T> {
        self.section(section)?
            .get(key)
            .map(|entry| T::from_raw(entry.value()))
    }

    pub fn read_string(&self, section: &str, key: &str) -> Result<String> {
        self.read(section, key)
    }

    pub fn read_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.try_read_string(section, key)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn try_read_string(&self, section: &str, key: &str) -> Option<String> {
        self.try_read(section, key)
    }

    pub fn read_int(&self, section: &str, key: &str) -> Result<i64> {
        self.read(section, key)
    }

    pub fn read_int_or(&self, section: &str, key: &str, default: i64) -> i64 {
        self.read_or(section, key, default)
    }

    pub fn try_read_int(&self, section: &str, key: &str) -> Option<i64> {
        self.try_read(section, key)
    }

    pub fn read_float(&self, section: &str, key: &str) -> Result<f64> {
        self.read(section, key)
    }

    pub fn read_float_or(&self, section: &str, key: &str, default: f64) -> f64 {
        self.read_or(section, key, default)
    }

    pub fn try_read_float(&self, section: &str, key: &str) -> Option<f64> {
        self.try_read(section, key)
    }

    pub fn read_bool(&self, section: &str, key: &str) -> Result<bool> {
        self.read(section, key)
    }

    pub fn read_bool_or(&self, section: &str, key: &str, default: bool) -> bool {
        self.read_or(section, key, default)
    }

    pub fn try_read_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.try_read(section, key)
    }

    // Write path

    /// Store a typed value in its canonical text form.
    ///
    /// Creates the section and key as needed. Writing the value already stored
    /// is a no-op: the document stays clean and nothing is saved.
    pub fn write<T: IniValue>(&mut self, section: &str, key: &str, value: T) -> Result<()> {
        self.write_raw(section, key, &value.to_raw())
    }

    pub fn write_string(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        self.write_raw(section, key, value)
    }

    pub fn write_int(&mut self, section: &str, key: &str, value: i64) -> Result<()> {
        self.write(section, key, value)
    }

    pub fn write_float(&mut self, section: &str, key: &str, value: f64) -> Result<()> {
        self.write(section, key, value)
    }

    pub fn write_bool(&mut self, section: &str, key: &str, value: bool) -> Result<()> {
        self.write(section, key, value)
    }

    /// Remove every entry of a section, keeping its header and comments
    pub fn erase_section(&mut self, section: &str) -> Result<()> {
        let pos = self.section_position(section)?;
        self.sections[pos].clear_entries();
        self.mark_changed()
    }

    /// Remove a section with its comments and entries
    pub fn delete_section(&mut self, section: &str) -> Result<()> {
        let pos = self.section_position(section)?;
        self.sections.remove(pos);
        self.reindex();
        self.mark_changed()
    }

    pub fn delete_key(&mut self, section: &str, key: &str) -> Result<()> {
        let pos = self.section_position(section)?;
        if self.sections[pos].remove(key).is_none() {
            return Err(self.key_not_found(section, key));
        }
        self.mark_changed()
    }

    /// Discard every section, preamble entry and comment
    pub fn clear_all(&mut self) -> Result<()> {
        self.preamble.clear();
        self.sections.clear();
        self.index.clear();
        self.trailing_comments.clear();
        self.mark_changed()
    }

    fn write_raw(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        self.check_representable(section, key, value)?;

        match self.index.get(section).copied() {
            None => {
                let mut created = Section::new(section);
                created.push(Entry::new(key, value));
                self.index.insert(section.to_string(), self.sections.len());
                self.sections.push(created);
            }
            Some(pos) => {
                let target = &mut self.sections[pos];
                if let Some(entry) = target.get_mut(key) {
                    if !entry.set_value(value) {
                        return Ok(());
                    }
                } else {
                    target.push(Entry::new(key, value));
                }
            }
        }
        self.mark_changed()
    }

    fn mark_changed(&mut self) -> Result<()> {
        self.dirty = true;
        if self.batch_depth == 0 {
            self.save()
        } else {
            log::trace!(
                "Deferring save of {} inside batch (depth {})",
                self.storage.name(),
                self.batch_depth
            );
            Ok(())
        }
    }

    /// Reject text that would read back differently after a save
    fn check_representable(&self, section: &str, key: &str, value: &str) -> Result<()> {
        let reject = |text: &str, reason: &'static str| {
            Err(IniError::Unrepresentable {
                text: text.to_string(),
                reason,
                source_name: self.source_name().to_string(),
            })
        };
        let has_line_break = |text: &str| text.contains(['\r', '\n']);

        if has_line_break(section) {
            return reject(section, "section names cannot contain line breaks");
        }
        if has_line_break(key) {
            return reject(key, "keys cannot contain line breaks");
        }
        if key.contains('=') {
            return reject(key, "keys cannot contain '='");
        }
        if key.trim() != key {
            return reject(key, "keys cannot start or end with whitespace");
        }
        if key.starts_with([';', '[']) {
            return reject(key, "keys cannot start with ';' or '['");
        }
        if has_line_break(value) {
            return reject(value, "values cannot contain line breaks");
        }
        if value.trim_start() != value {
            return reject(value, "values cannot start with whitespace");
        }
        Ok(())
    }

    fn install(&mut self, parsed: Parsed) {
        self.preamble = parsed.preamble;
        self.sections = parsed.sections;
        self.trailing_comments = parsed.trailing_comments;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, section) in self.sections.iter().enumerate() {
            self.index.insert(section.name().to_string(), pos);
        }
    }

    fn section_position(&self, section: &str) -> Result<usize> {
        self.index
            .get(section)
            .copied()
            .ok_or_else(|| IniError::SectionNotFound {
                section: section.to_string(),
                source_name: self.source_name().to_string(),
            })
    }

    fn require_section(&self, section: &str) -> Result<&Section> {
        let pos = self.section_position(section)?;
        Ok(&self.sections[pos])
    }

    fn require_entry(&self, section: &str, key: &str) -> Result<&Entry> {
        self.require_section(section)?
            .get(key)
            .ok_or_else(|| self.key_not_found(section, key))
    }

    fn key_not_found(&self, section: &str, key: &str) -> IniError {
        IniError::KeyNotFound {
            section: section.to_string(),
            key: key.to_string(),
            source_name: self.source_name().to_string(),
        }
    }
}

fn read_parsed<S: Storage>(storage: &S, mode: LoadMode) -> Result<Parsed> {
    let source_name = storage.name();
    let contents = storage.read().map_err(|source| IniError::Storage {
        source_name: source_name.to_string(),
        source,
    })?;

    match (contents, mode) {
        (Some(text), _) => parse_str(&text, source_name),
        (None, LoadMode::Lenient) => {
            log::debug!("{source_name} does not exist yet, starting empty");
            Ok(Parsed::default())
        }
        (None, LoadMode::Strict) => Err(IniError::StorageNotFound {
            source_name: source_name.to_string(),
        }),
    }
}

impl<S: Storage> Drop for IniDocument<S> {
    fn drop(&mut self) {
        if self.dirty
            && let Err(e) = self.save()
        {
            log::error!("Failed to save {} on close: {e}", self.storage.name());
        }
    }
}

impl<S: Storage> fmt::Display for IniDocument<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ini_string())
    }
}

impl<S: Storage> fmt::Debug for IniDocument<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IniDocument")
            .field("source", &self.storage.name())
            .field("preamble", &self.preamble)
            .field("sections", &self.sections)
            .field("dirty", &self.dirty)
            .field("batch_depth", &self.batch_depth)
            .finish()
    }
}

/// Scope of one batch level; see [`IniDocument::begin_batch`].
///
/// Dropping the guard closes the batch and logs a failed save. Call
/// [`UpdateGuard::finish`] to get the save error instead.
pub struct UpdateGuard<'a, S: Storage> {
    doc: &'a mut IniDocument<S>,
    finished: bool,
}

impl<S: Storage> UpdateGuard<'_, S> {
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.doc.end_update()
    }
}

impl<S: Storage> Deref for UpdateGuard<'_, S> {
    type Target = IniDocument<S>;

    fn deref(&self) -> &Self::Target {
        self.doc
    }
}

impl<S: Storage> DerefMut for UpdateGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.doc
    }
}

impl<S: Storage> Drop for UpdateGuard<'_, S> {
    fn drop(&mut self) {
        if !self.finished
            && let Err(e) = self.doc.end_update()
        {
            log::error!("Failed to close batch on {}: {e}", self.doc.source_name());
        }
    }
}
