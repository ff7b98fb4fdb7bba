//! An editing session over one file on disk.
//!
//! Every edit is applied to a copy of the document, written through the
//! persistence layer, and only then committed to memory and history. A failed
//! write leaves the in-memory document, the history cursor and the file on
//! disk exactly as they were.

use std::path::Path;

use crate::error::{Error, Result};
use crate::history::{Change, ChangeStack};
use crate::model::EnvFile;
use crate::parser;
use crate::persist::{self, Filesystem, OsFilesystem};
use crate::types::{Entry, FileComparison, KeyValue};

pub struct Session<F: Filesystem = OsFilesystem> {
    file: EnvFile,
    /// Document as it was when the session opened (or last reloaded).
    original: EnvFile,
    history: ChangeStack,
    fs: F,
}

impl Session {
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        Self::open_with(OsFilesystem, path, capacity)
    }
}

impl<F: Filesystem> Session<F> {
    pub fn open_with(fs: F, path: &Path, capacity: usize) -> Result<Self> {
        let file = persist::read_file_with(&fs, path)?;
        Ok(Self {
            original: file.clone(),
            file,
            history: ChangeStack::new(capacity),
            fs,
        })
    }

    pub fn file(&self) -> &EnvFile {
        &self.file
    }

    pub fn original(&self) -> &EnvFile {
        &self.original
    }

    pub fn history(&self) -> &ChangeStack {
        &self.history
    }

    /// Set `key` to `value` and save.
    ///
    /// An existing key keeps its position, export flag and inline comment.
    /// A new key is appended, with `export ` when `exported` is set.
    pub fn set(&mut self, key: &str, value: &str, exported: bool) -> Result<Change> {
        if !parser::is_valid_key(key) {
            return Err(Error::InvalidKey(key.to_string()));
        }

        let mut next = self.file.clone();
        let change = match next.get(key).map(|kv| kv.value.clone()) {
            Some(old_value) => {
                next.update(key, value);
                let entry = next
                    .get(key)
                    .cloned()
                    .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
                Change::Update { entry, old_value }
            }
            None => {
                let index = next.entries().len();
                next.add(KeyValue::new(key, value).with_exported(exported).into());
                let entry = next
                    .get(key)
                    .cloned()
                    .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
                Change::Add { entry, index }
            }
        };

        self.commit(next)?;
        self.history.push(change.clone());
        tracing::debug!(change = %change.describe(), "applied");
        Ok(change)
    }

    /// Remove the first entry with `key` and save. `None` when the key is absent.
    pub fn unset(&mut self, key: &str) -> Result<Option<Change>> {
        let Some(index) = self.file.position(key) else {
            return Ok(None);
        };

        let mut next = self.file.clone();
        let Some(Entry::KeyValue(entry)) = next.remove_at(index) else {
            return Ok(None);
        };
        let change = Change::Delete { entry, index };

        self.commit(next)?;
        self.history.push(change.clone());
        tracing::debug!(change = %change.describe(), "applied");
        Ok(Some(change))
    }

    /// Revert the most recent change and save. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Change>> {
        let Some(change) = self.history.undo().cloned() else {
            return Ok(None);
        };

        let mut next = self.file.clone();
        revert(&mut next, &change);
        if let Err(e) = self.commit(next) {
            self.history.redo();
            return Err(e);
        }
        tracing::debug!(change = %change.describe(), "undone");
        Ok(Some(change))
    }

    /// Reapply the next undone change and save. `None` at the head of history.
    pub fn redo(&mut self) -> Result<Option<Change>> {
        let Some(change) = self.history.redo().cloned() else {
            return Ok(None);
        };

        let mut next = self.file.clone();
        apply(&mut next, &change);
        if let Err(e) = self.commit(next) {
            self.history.undo();
            return Err(e);
        }
        tracing::debug!(change = %change.describe(), "redone");
        Ok(Some(change))
    }

    /// Current document against the state the session started from.
    pub fn compare_with_original(&self) -> FileComparison {
        self.file.compare(&self.original)
    }

    /// Re-read the file from disk, resetting the baseline and clearing history.
    pub fn reload(&mut self) -> Result<()> {
        let file = persist::read_file_with(&self.fs, self.file.path())?;
        self.original = file.clone();
        self.file = file;
        self.history.clear();
        Ok(())
    }

    fn commit(&mut self, mut next: EnvFile) -> Result<()> {
        self.warn_if_changed_on_disk();
        persist::write_file_with(&self.fs, &next)?;
        next.set_loaded_hash(parser::content_hash(&parser::serialize(&next)));
        next.mark_saved();
        self.file = next;
        Ok(())
    }

    fn warn_if_changed_on_disk(&self) {
        let Some(expected) = self.file.loaded_hash() else {
            return;
        };
        let Ok(text) = self.fs.read_to_string(self.file.path()) else {
            return;
        };
        if parser::content_hash(&text) != expected {
            tracing::warn!(
                path = %self.file.path().display(),
                "file changed on disk since it was loaded, overwriting"
            );
        }
    }
}

/// Undo `change` against `file`.
fn revert(file: &mut EnvFile, change: &Change) {
    match change {
        Change::Add { entry, index } => remove_recorded(file, entry, *index),
        Change::Update { entry, old_value } => {
            file.update(&entry.key, old_value.as_str());
        }
        Change::Delete { entry, index } => file.insert_at(*index, entry.clone().into()),
    }
}

/// Redo `change` against `file`.
fn apply(file: &mut EnvFile, change: &Change) {
    match change {
        Change::Add { entry, index } => file.insert_at(*index, entry.clone().into()),
        Change::Update { entry, .. } => {
            file.update(&entry.key, entry.value.as_str());
        }
        Change::Delete { entry, index } => remove_recorded(file, entry, *index),
    }
}

/// Remove the entry a change recorded at `index`, falling back to the first
/// entry with the same key when the document no longer lines up.
fn remove_recorded(file: &mut EnvFile, entry: &KeyValue, index: usize) {
    let at_index = file
        .entries()
        .get(index)
        .and_then(Entry::as_key_value)
        .is_some_and(|kv| kv.key == entry.key);
    if at_index {
        file.remove_at(index);
    } else {
        file.delete(&entry.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FaultyFs, Phase, write_env};

    fn disk(session: &Session<impl Filesystem>) -> String {
        std::fs::read_to_string(session.file().path()).unwrap()
    }

    #[test]
    fn set_new_key_appends_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let mut session = Session::open(&path, 10).unwrap();

        let change = session.set("B", "2", true).unwrap();

        assert!(matches!(change, Change::Add { index: 1, .. }));
        assert_eq!(disk(&session), "A=1\nexport B=2\n");
        assert!(!session.file().is_modified());
        assert!(session.history().can_undo());
    }

    #[test]
    fn set_existing_key_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "export A=1 # note\nB=2\n");
        let mut session = Session::open(&path, 10).unwrap();

        let change = session.set("A", "9", false).unwrap();

        match change {
            Change::Update { entry, old_value } => {
                assert_eq!(old_value, "1");
                assert_eq!(entry.value, "9");
            }
            other => panic!("unexpected change {other:?}"),
        }
        assert_eq!(disk(&session), "export A=9 # note\nB=2\n");
    }

    #[test]
    fn invalid_key_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let mut session = Session::open(&path, 10).unwrap();

        let err = session.set("1BAD", "x", false).unwrap_err();

        assert!(matches!(err, Error::InvalidKey(_)));
        assert!(session.history().is_empty());
        assert!(persist::list_backups(&path).unwrap().is_empty());
    }

    #[test]
    fn unset_missing_key_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let mut session = Session::open(&path, 10).unwrap();

        assert!(session.unset("B").unwrap().is_none());
        assert!(session.history().is_empty());
    }

    #[test]
    fn undo_and_redo_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\nB=2\n");
        let mut session = Session::open(&path, 10).unwrap();

        session.unset("A").unwrap();
        assert_eq!(disk(&session), "B=2\n");

        let undone = session.undo().unwrap().unwrap();
        assert_eq!(undone.describe(), "delete A");
        assert_eq!(disk(&session), "A=1\nB=2\n");

        session.redo().unwrap();
        assert_eq!(disk(&session), "B=2\n");
        assert!(session.redo().unwrap().is_none());
    }

    #[test]
    fn undoing_everything_restores_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let text = "# settings\nA=1\n\nB=\"two words\"\nA=dup\n";
        let path = write_env(dir.path(), text);
        let mut session = Session::open(&path, 10).unwrap();
        let original = session.file().entries().to_vec();

        session.set("C", "3", false).unwrap();
        session.set("A", "changed", false).unwrap();
        session.unset("B").unwrap();
        session.unset("A").unwrap();
        session.set("B", "back", true).unwrap();

        while session.undo().unwrap().is_some() {}

        assert_eq!(session.file().entries(), original.as_slice());
        assert_eq!(disk(&session), text);

        while session.redo().unwrap().is_some() {}
        assert_eq!(
            disk(&session),
            "# settings\n\nA=dup\nC=3\nexport B=back\n"
        );
    }

    #[test]
    fn failed_write_leaves_session_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let fs = FaultyFs::failing(Phase::Rename);
        let mut session = Session::open_with(&fs, &path, 10).unwrap();

        assert!(session.set("A", "2", false).is_err());

        assert_eq!(session.file().get("A").unwrap().value, "1");
        assert!(session.history().is_empty());
        assert_eq!(disk(&session), "A=1\n");
    }

    #[test]
    fn failed_undo_keeps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let fs = FaultyFs::default();
        let mut session = Session::open_with(&fs, &path, 10).unwrap();
        session.set("A", "2", false).unwrap();

        fs.fail_on(Some(Phase::Write));
        assert!(session.undo().is_err());
        assert_eq!(session.history().position(), Some(0));
        assert_eq!(session.file().get("A").unwrap().value, "2");

        fs.fail_on(None);
        session.undo().unwrap();
        assert_eq!(disk(&session), "A=1\n");

        fs.fail_on(Some(Phase::Write));
        assert!(session.redo().is_err());
        assert_eq!(session.history().position(), None);
        assert!(session.history().can_redo());
    }

    #[test]
    fn compare_with_original_tracks_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\nB=2\n");
        let mut session = Session::open(&path, 10).unwrap();

        session.set("A", "9", false).unwrap();
        session.set("C", "3", false).unwrap();
        session.unset("B").unwrap();

        let cmp = session.compare_with_original();
        assert_eq!(cmp.different, 1);
        assert_eq!(cmp.only_in_current, 1);
        assert_eq!(cmp.only_in_other, 1);
    }

    #[test]
    fn reload_resets_baseline_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let mut session = Session::open(&path, 10).unwrap();
        session.set("A", "2", false).unwrap();
        std::fs::write(&path, "A=3\n").unwrap();

        session.reload().unwrap();

        assert_eq!(session.file().get("A").unwrap().value, "3");
        assert!(!session.compare_with_original().has_differences());
        assert!(session.history().is_empty());
    }
}
