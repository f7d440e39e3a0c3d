use std::collections::HashMap;

use super::Entry;

/// A `[name]` header, the comments above it, and its entries in file order.
///
/// Keys are looked up through an index that maps each key to the position of
/// its last occurrence in `entries`. Every structural change goes through this
/// type so the index is rebuilt together with the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    comments: Vec<String>,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_comments(name, Vec::new())
    }

    pub fn with_comments(name: impl Into<String>, comments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            comments,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Comment text (without the leading `;`) found above the header
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        let pos = *self.index.get(key)?;
        self.entries.get_mut(pos)
    }

    /// Append an entry. Returns `true` when the key was already present; the
    /// index then points at the new (last) occurrence.
    pub(crate) fn push(&mut self, entry: Entry) -> bool {
        let duplicate = self
            .index
            .insert(entry.key().to_string(), self.entries.len())
            .is_some();
        self.entries.push(entry);
        duplicate
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Entry> {
        let pos = *self.index.get(key)?;
        let entry = self.entries.remove(pos);
        self.reindex();
        Some(entry)
    }

    /// Drop all entries, keeping the header and its comments
    pub(crate) fn clear_entries(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, entry) in self.entries.iter().enumerate() {
            self.index.insert(entry.key().to_string(), pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section_with(keys: &[(&str, &str)]) -> Section {
        let mut section = Section::new("test");
        for (key, value) in keys {
            section.push(Entry::new(*key, *value));
        }
        section
    }

    #[test]
    fn test_new_section_is_empty() {
        let section = Section::new("empty");
        assert!(section.is_empty());
        assert_eq!(section.len(), 0);
        assert_eq!(section.name(), "empty");
        assert!(section.comments().is_empty());
    }

    #[test]
    fn test_keys_in_insertion_order() {
        let section = section_with(&[("z", "1"), ("a", "2"), ("m", "3")]);
        let keys: Vec<_> = section.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_key_last_wins_but_both_kept() {
        let mut section = section_with(&[("dup", "first")]);
        let was_duplicate = section.push(Entry::new("dup", "second"));

        assert!(was_duplicate);
        assert_eq!(section.len(), 2);
        assert_eq!(section.get("dup").unwrap().value(), "second");
    }

    #[test]
    fn test_remove_rebuilds_index() {
        let mut section = section_with(&[("a", "1"), ("b", "2"), ("c", "3")]);

        let removed = section.remove("a").unwrap();
        assert_eq!(removed.value(), "1");

        // Positions shifted, lookups must still land on the right entries
        assert_eq!(section.get("b").unwrap().value(), "2");
        assert_eq!(section.get("c").unwrap().value(), "3");
        assert!(!section.contains_key("a"));
        assert!(section.remove("a").is_none());
    }

    #[test]
    fn test_remove_duplicate_exposes_earlier_occurrence() {
        let mut section = section_with(&[("dup", "first"), ("other", "x"), ("dup", "second")]);

        section.remove("dup");

        assert_eq!(section.get("dup").unwrap().value(), "first");
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn test_clear_entries_keeps_header_comments() {
        let mut section = Section::with_comments("s", vec![" header".to_string()]);
        section.push(Entry::new("k", "v"));

        section.clear_entries();

        assert!(section.is_empty());
        assert!(!section.contains_key("k"));
        assert_eq!(section.comments(), &[" header".to_string()]);
    }

    #[test]
    fn test_get_mut_updates_value() {
        let mut section = section_with(&[("k", "v")]);
        assert!(section.get_mut("k").unwrap().set_value("w"));
        assert_eq!(section.get("k").unwrap().value(), "w");
        assert!(section.get_mut("missing").is_none());
    }
}
