//! Crash-safe persistence: backup before every write, temp file plus rename,
//! and management of the timestamped backups that accumulate next to a file.
//!
//! File names are fixed and relied on by [`list_backups`]:
//! - `{path}.backup.{YYYYMMDD-HHMMSS}` before each write
//! - `{path}.backup.pre-restore.{YYYYMMDD-HHMMSS}` before each restore
//! - `{path}.tmp` while a write is in flight
//!
//! Timestamps have one-second resolution. Two backups of the same file within
//! the same second share a name and the later one silently replaces the
//! earlier.

pub mod fs;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

pub use fs::{Filesystem, OsFilesystem};

use crate::error::{Error, Result};
use crate::model::EnvFile;
use crate::parser;
use crate::types::BackupInfo;

/// `chrono` format of the backup timestamp suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

const BACKUP_MARKER: &str = ".backup.";
const PRE_RESTORE: &str = "pre-restore.";

/// Read and parse a file from disk.
pub fn read_file(path: &Path) -> Result<EnvFile> {
    read_file_with(&OsFilesystem, path)
}

pub fn read_file_with(fs: &impl Filesystem, path: &Path) -> Result<EnvFile> {
    if !fs.exists(path) {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = fs.read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut file = parser::parse(&text);
    file.set_path(path);
    file.set_loaded_hash(parser::content_hash(&text));
    tracing::debug!(path = %path.display(), entries = file.entries().len(), "loaded");
    Ok(file)
}

/// Back up the current file, then atomically replace it with `file` serialized.
pub fn write_file(file: &EnvFile) -> Result<()> {
    write_file_with(&OsFilesystem, file)
}

/// Write through the given filesystem. Either every phase succeeds or the
/// target keeps its previous content and no temp file is left behind.
pub fn write_file_with(fs: &impl Filesystem, file: &EnvFile) -> Result<()> {
    let path = file.path();
    create_backup_with(fs, path)?;

    let content = parser::serialize(file);
    let tmp = with_suffix(path, ".tmp");

    if let Err(source) = fs.write_synced(&tmp, content.as_bytes()) {
        let _ = fs.remove_file(&tmp);
        return Err(Error::TempWrite { path: tmp, source });
    }

    if let Err(source) = fs.rename(&tmp, path) {
        let _ = fs.remove_file(&tmp);
        return Err(Error::Rename {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::info!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Copy `path` to a timestamped sibling. A missing file is not an error and
/// yields `None`.
pub fn create_backup(path: &Path) -> Result<Option<PathBuf>> {
    create_backup_with(&OsFilesystem, path)
}

pub fn create_backup_with(fs: &impl Filesystem, path: &Path) -> Result<Option<PathBuf>> {
    if !fs.exists(path) {
        return Ok(None);
    }
    let backup = backup_path(path, now());
    fs.copy(path, &backup).map_err(|source| Error::Backup {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(backup = %backup.display(), "created backup");
    Ok(Some(backup))
}

/// Backups of `path` found in its directory, newest first.
///
/// Files whose suffix is not a valid timestamp are skipped.
pub fn list_backups(path: &Path) -> Result<Vec<BackupInfo>> {
    list_backups_with(&OsFilesystem, path)
}

pub fn list_backups_with(fs: &impl Filesystem, path: &Path) -> Result<Vec<BackupInfo>> {
    let dir = path.parent().unwrap_or(Path::new(""));
    let Some(base) = path.file_name() else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}{BACKUP_MARKER}", base.to_string_lossy());

    let listing = if dir.as_os_str().is_empty() {
        fs.read_dir(Path::new("."))
    } else {
        fs.read_dir(dir)
    }
    .map_err(|source| Error::ListBackups {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut backups = Vec::new();
    for found in listing {
        let Some(name) = found.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let Some(suffix) = name.strip_prefix(&prefix) else {
            continue;
        };
        let (pre_restore, stamp) = match suffix.strip_prefix(PRE_RESTORE) {
            Some(stamp) => (true, stamp),
            None => (false, suffix),
        };
        let Ok(timestamp) = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT) else {
            continue;
        };
        let Ok(meta) = fs.metadata(&found) else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        backups.push(BackupInfo {
            path: dir.join(&name),
            timestamp,
            size: meta.len(),
            pre_restore,
        });
    }

    backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(backups)
}

/// Copy a backup over `target`, first saving the current target as a
/// pre-restore backup so the restore itself can be undone.
pub fn restore_backup(backup: &Path, target: &Path) -> Result<()> {
    restore_backup_with(&OsFilesystem, backup, target)
}

pub fn restore_backup_with(fs: &impl Filesystem, backup: &Path, target: &Path) -> Result<()> {
    if !fs.exists(backup) {
        return Err(Error::FileNotFound(backup.to_path_buf()));
    }

    if fs.exists(target) {
        let safety = pre_restore_path(target, now());
        fs.copy(target, &safety).map_err(|source| Error::Backup {
            path: target.to_path_buf(),
            source,
        })?;
        tracing::debug!(backup = %safety.display(), "saved pre-restore copy");
    }

    fs.copy(backup, target).map_err(|source| Error::Restore {
        path: target.to_path_buf(),
        source,
    })?;
    tracing::info!(from = %backup.display(), to = %target.display(), "restored backup");
    Ok(())
}

/// Remove a backup file. No safety copy is made.
pub fn delete_backup(path: &Path) -> Result<()> {
    delete_backup_with(&OsFilesystem, path)
}

pub fn delete_backup_with(fs: &impl Filesystem, path: &Path) -> Result<()> {
    fs.remove_file(path).map_err(|source| Error::DeleteBackup {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(backup = %path.display(), "deleted backup");
    Ok(())
}

/// `{path}.backup.{timestamp}`
pub fn backup_path(path: &Path, at: NaiveDateTime) -> PathBuf {
    with_suffix(path, &format!("{BACKUP_MARKER}{}", at.format(TIMESTAMP_FORMAT)))
}

/// `{path}.backup.pre-restore.{timestamp}`
pub fn pre_restore_path(path: &Path, at: NaiveDateTime) -> PathBuf {
    with_suffix(
        path,
        &format!("{BACKUP_MARKER}{PRE_RESTORE}{}", at.format(TIMESTAMP_FORMAT)),
    )
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FaultyFs, Phase, write_env};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 17)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn backup_names_are_bit_exact() {
        let p = Path::new("/srv/app/.env");
        assert_eq!(
            backup_path(p, at(9, 5, 7)),
            PathBuf::from("/srv/app/.env.backup.20240617-090507")
        );
        assert_eq!(
            pre_restore_path(p, at(23, 59, 59)),
            PathBuf::from("/srv/app/.env.backup.pre-restore.20240617-235959")
        );
    }

    #[test]
    fn read_file_sets_path_and_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let file = read_file(&path).unwrap();
        assert_eq!(file.path(), path.as_path());
        assert_eq!(file.loaded_hash(), Some(parser::content_hash("A=1\n").as_str()));
        assert_eq!(file.get("A").unwrap().value, "1");
    }

    #[test]
    fn read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join(".env")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn create_backup_of_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_backup(&dir.path().join(".env")).unwrap();
        assert!(result.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn create_backup_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let backup = create_backup(&path).unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "A=1\n");

        let listed = list_backups(&path).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, backup);
        assert_eq!(listed[0].size, 4);
        assert!(!listed[0].pre_restore);
    }

    #[test]
    fn write_file_backs_up_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let mut file = read_file(&path).unwrap();
        file.update("A", "2");

        write_file(&file).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=2\n");
        let backups = list_backups(&path).unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(&backups[0].path).unwrap(), "A=1\n");
        assert!(!with_suffix(&path, ".tmp").exists());
    }

    #[test]
    fn write_new_file_skips_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = crate::parser::parse("A=1");
        file.set_path(&path);

        write_file(&file).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\n");
        assert!(list_backups(&path).unwrap().is_empty());
    }

    #[test]
    fn rename_failure_leaves_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "# original\nA=1\n");
        let mut file = read_file(&path).unwrap();
        file.update("A", "2");

        let err = write_file_with(&FaultyFs::failing(Phase::Rename), &file).unwrap_err();

        assert!(matches!(err, Error::Rename { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# original\nA=1\n");
        assert!(!with_suffix(&path, ".tmp").exists());
    }

    #[test]
    fn temp_write_failure_leaves_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let file = read_file(&path).unwrap();

        let err = write_file_with(&FaultyFs::failing(Phase::Write), &file).unwrap_err();

        assert!(matches!(err, Error::TempWrite { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\n");
        assert!(!with_suffix(&path, ".tmp").exists());
    }

    #[test]
    fn backup_failure_aborts_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let mut file = read_file(&path).unwrap();
        file.update("A", "2");

        let err = write_file_with(&FaultyFs::failing(Phase::Copy), &file).unwrap_err();

        assert!(matches!(err, Error::Backup { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\n");
    }

    #[test]
    fn list_backups_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        for t in [at(10, 0, 0), at(12, 0, 0), at(11, 0, 0)] {
            std::fs::write(backup_path(&path, t), "x").unwrap();
        }

        let stamps: Vec<_> = list_backups(&path)
            .unwrap()
            .into_iter()
            .map(|b| b.timestamp)
            .collect();
        assert_eq!(stamps, vec![at(12, 0, 0), at(11, 0, 0), at(10, 0, 0)]);
    }

    #[test]
    fn list_backups_skips_unparseable_and_foreign() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        std::fs::write(dir.path().join(".env.backup.not-a-date"), "x").unwrap();
        std::fs::write(dir.path().join(".env.local.backup.20240101-000000"), "x").unwrap();
        std::fs::write(backup_path(&path, at(8, 0, 0)), "x").unwrap();
        std::fs::write(pre_restore_path(&path, at(9, 0, 0)), "x").unwrap();

        let backups = list_backups(&path).unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].pre_restore);
        assert_eq!(backups[0].timestamp, at(9, 0, 0));
        assert!(!backups[1].pre_restore);
    }

    #[test]
    fn restore_saves_pre_restore_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=current\n");
        let backup = backup_path(&path, at(7, 0, 0));
        std::fs::write(&backup, "A=old\n").unwrap();

        restore_backup(&backup, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=old\n");
        let safety: Vec<_> = list_backups(&path)
            .unwrap()
            .into_iter()
            .filter(|b| b.pre_restore)
            .collect();
        assert_eq!(safety.len(), 1);
        assert_eq!(std::fs::read_to_string(&safety[0].path).unwrap(), "A=current\n");
    }

    #[test]
    fn restore_into_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let backup = backup_path(&path, at(7, 0, 0));
        std::fs::write(&backup, "A=old\n").unwrap();

        restore_backup(&backup, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=old\n");
        assert!(list_backups(&path).unwrap().iter().all(|b| !b.pre_restore));
    }

    #[test]
    fn restore_missing_backup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let err = restore_backup(&dir.path().join("nope"), &path).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\n");
    }

    #[test]
    fn delete_backup_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let backup = create_backup(&path).unwrap().unwrap();

        delete_backup(&backup).unwrap();

        assert!(!backup.exists());
        assert!(matches!(
            delete_backup(&backup).unwrap_err(),
            Error::DeleteBackup { .. }
        ));
    }

    #[test]
    fn delete_failure_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        let backup = create_backup(&path).unwrap().unwrap();

        let err = delete_backup_with(&FaultyFs::failing(Phase::Remove), &backup).unwrap_err();

        assert!(matches!(err, Error::DeleteBackup { path, .. } if path == backup));
        assert!(backup.exists());
        assert_eq!(list_backups(&path).unwrap().len(), 1);
    }

    #[test]
    fn list_failure_reports_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        create_backup(&path).unwrap();

        let err = list_backups_with(&FaultyFs::failing(Phase::ReadDir), &path).unwrap_err();

        assert!(matches!(err, Error::ListBackups { path: d, .. } if d == dir.path()));
        assert_eq!(list_backups_with(&FaultyFs::default(), &path).unwrap().len(), 1);
    }

    #[test]
    fn list_backups_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_env(dir.path(), "A=1\n");
        std::fs::create_dir(backup_path(&path, at(6, 0, 0))).unwrap();
        std::fs::write(backup_path(&path, at(7, 0, 0)), "x").unwrap();

        let backups = list_backups(&path).unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].timestamp, at(7, 0, 0));
    }
}
