use std::path::Path;

use git2::{ErrorCode, Repository, Status};

use crate::error::{Error, Result};
use crate::types::GitStatus;

/// Git state of the file at `path`.
///
/// Returns `NotInRepo` outside a repository (or in a bare one) and `Err`
/// only on unexpected failures.
pub fn file_status(path: &Path) -> Result<GitStatus> {
    let path = std::path::absolute(path)?;
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(GitStatus::NotInRepo);
    };

    let repo = match Repository::discover(dir) {
        Ok(r) => r,
        Err(_) => return Ok(GitStatus::NotInRepo),
    };
    let Some(workdir) = repo.workdir() else {
        return Ok(GitStatus::NotInRepo);
    };

    let workdir = workdir.canonicalize()?;
    let full = dir.canonicalize()?.join(name);
    let relative = full
        .strip_prefix(&workdir)
        .map_err(|e| Error::Other(format!("failed to compute path inside repository: {e}")))?;

    match repo.status_file(relative) {
        Ok(status) => Ok(classify(status)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(GitStatus::Untracked),
        Err(e) => Err(e.into()),
    }
}

/// Current branch name of the repository containing `dir`, if any.
pub fn branch(dir: &Path) -> Result<Option<String>> {
    let repo = match Repository::discover(dir) {
        Ok(r) => r,
        Err(_) => return Ok(None),
    };
    let head = match repo.head() {
        Ok(h) => h,
        // Fresh repository without commits.
        Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(head.shorthand().map(str::to_string))
}

fn classify(status: Status) -> GitStatus {
    if status.is_ignored() {
        GitStatus::Ignored
    } else if status.is_wt_new() {
        GitStatus::Untracked
    } else if status.intersects(Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_RENAMED) {
        GitStatus::Modified
    } else if status.intersects(
        Status::INDEX_NEW | Status::INDEX_MODIFIED | Status::INDEX_DELETED | Status::INDEX_RENAMED,
    ) {
        GitStatus::Staged
    } else {
        GitStatus::Clean
    }
}
