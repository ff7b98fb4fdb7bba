use std::path::PathBuf;

/// All errors produced by envedit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create backup of {path}: {source}")]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write temp file {path}: {source}")]
    TempWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to replace {path}: {source}")]
    Rename {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to restore {path}: {source}")]
    Restore {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to list backups in {path}: {source}")]
    ListBackups {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to delete backup {path}: {source}")]
    DeleteBackup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid key '{0}': keys must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidKey(String),

    #[error("validation failed with {0} error(s)")]
    Validation(usize),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
