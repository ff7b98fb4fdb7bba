pub mod compare;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::types::{Entry, KeyValue};

/// An in-memory .env document: ordered entries plus the path it belongs to.
///
/// Key-based operations address the first `KeyValue` with a matching key;
/// later duplicates are only reachable by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    path: PathBuf,
    entries: Vec<Entry>,
    modified: bool,
    /// SHA-256 of the text this document was loaded from.
    loaded_hash: Option<String>,
}

impl EnvFile {
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate over key/value entries in document order.
    pub fn key_values(&self) -> impl Iterator<Item = &KeyValue> {
        self.entries.iter().filter_map(Entry::as_key_value)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the modified flag after the document has been written.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn loaded_hash(&self) -> Option<&str> {
        self.loaded_hash.as_deref()
    }

    pub fn set_loaded_hash(&mut self, hash: String) {
        self.loaded_hash = Some(hash);
    }

    /// Index of the first key/value entry with this key.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.as_key_value().is_some_and(|kv| kv.key == key))
    }

    /// First key/value entry with this key.
    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.key_values().find(|kv| kv.key == key)
    }

    /// Append an entry. Existing keys are not checked; duplicates are allowed.
    pub fn add(&mut self, mut entry: Entry) {
        entry.set_line(self.next_line());
        self.entries.push(entry);
        self.modified = true;
    }

    /// Set the value of the first entry with this key. Other fields are left alone.
    pub fn update(&mut self, key: &str, value: impl Into<String>) -> bool {
        let Some(kv) = self.first_mut(key) else {
            return false;
        };
        kv.value = value.into();
        self.modified = true;
        true
    }

    /// Set the `export` flag of the first entry with this key.
    pub fn set_exported(&mut self, key: &str, exported: bool) -> bool {
        let Some(kv) = self.first_mut(key) else {
            return false;
        };
        if kv.exported != exported {
            kv.exported = exported;
            self.modified = true;
        }
        true
    }

    fn first_mut(&mut self, key: &str) -> Option<&mut KeyValue> {
        self.entries
            .iter_mut()
            .filter_map(Entry::as_key_value_mut)
            .find(|kv| kv.key == key)
    }

    /// Remove the first entry with this key.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                self.modified = true;
                true
            }
            None => false,
        }
    }

    /// Insert an entry at `index`, clamped to the end of the document.
    pub fn insert_at(&mut self, index: usize, entry: Entry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        self.modified = true;
    }

    /// Remove and return the entry at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<Entry> {
        if index >= self.entries.len() {
            return None;
        }
        self.modified = true;
        Some(self.entries.remove(index))
    }

    /// Key/value entries whose key or value fuzzily matches `query`.
    ///
    /// An empty query returns every key/value entry. Otherwise each character
    /// of the lowercased query must appear, in order, in the lowercased key or
    /// the lowercased value.
    pub fn filter(&self, query: &str) -> Vec<&KeyValue> {
        if query.is_empty() {
            return self.key_values().collect();
        }
        let query = query.to_lowercase();
        self.key_values()
            .filter(|kv| {
                fuzzy_match(&kv.key.to_lowercase(), &query)
                    || fuzzy_match(&kv.value.to_lowercase(), &query)
            })
            .collect()
    }

    fn next_line(&self) -> usize {
        self.entries.iter().map(Entry::line).max().unwrap_or(0) + 1
    }
}

/// Subsequence match: every char of `pattern` appears in `text` in order.
pub fn fuzzy_match(text: &str, pattern: &str) -> bool {
    let mut pattern = pattern.chars().peekable();
    for c in text.chars() {
        if pattern.peek() == Some(&c) {
            pattern.next();
        }
    }
    pattern.peek().is_none()
}
