use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::EnvFile;
use crate::persist::{Filesystem, OsFilesystem};
use crate::types::KeyValue;

/// Key/value entries of a document, in order.
pub fn key_values(file: &EnvFile) -> Vec<&KeyValue> {
    file.key_values().collect()
}

/// Write `content` to `{dir}/.env` and return its path.
pub fn write_env(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join(".env");
    std::fs::write(&path, content).unwrap();
    path
}

/// Filesystem operation a [`FaultyFs`] refuses to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Copy,
    Write,
    Rename,
    Remove,
    ReadDir,
}

/// Real filesystem with an optional phase that always fails.
#[derive(Default)]
pub struct FaultyFs {
    fail: Cell<Option<Phase>>,
}

impl FaultyFs {
    pub fn failing(phase: Phase) -> Self {
        let fs = Self::default();
        fs.fail_on(Some(phase));
        fs
    }

    pub fn fail_on(&self, phase: Option<Phase>) {
        self.fail.set(phase);
    }

    fn check(&self, phase: Phase) -> io::Result<()> {
        if self.fail.get() == Some(phase) {
            Err(io::Error::other(format!("injected {phase:?} failure")))
        } else {
            Ok(())
        }
    }
}

impl Filesystem for FaultyFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        OsFilesystem.read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        OsFilesystem.exists(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        self.check(Phase::Copy)?;
        OsFilesystem.copy(from, to)
    }

    fn write_synced(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.check(Phase::Write)?;
        OsFilesystem.write_synced(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.check(Phase::Rename)?;
        OsFilesystem.rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.check(Phase::Remove)?;
        OsFilesystem.remove_file(path)
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.check(Phase::ReadDir)?;
        OsFilesystem.read_dir(dir)
    }

    fn metadata(&self, path: &Path) -> io::Result<std::fs::Metadata> {
        OsFilesystem.metadata(path)
    }
}
