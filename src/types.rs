use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::parser;

/// One logical line of a .env document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A `KEY=VALUE` assignment.
    KeyValue(KeyValue),
    /// A full-line comment. `text` is the original line, `#` included.
    Comment { text: String, line: usize },
    /// An empty or whitespace-only line.
    Blank { line: usize },
}

impl Entry {
    /// 1-based source line number (last parse or append position).
    pub fn line(&self) -> usize {
        match self {
            Entry::KeyValue(kv) => kv.line,
            Entry::Comment { line, .. } | Entry::Blank { line } => *line,
        }
    }

    pub fn set_line(&mut self, n: usize) {
        match self {
            Entry::KeyValue(kv) => kv.line = n,
            Entry::Comment { line, .. } | Entry::Blank { line } => *line = n,
        }
    }

    pub fn as_key_value(&self) -> Option<&KeyValue> {
        match self {
            Entry::KeyValue(kv) => Some(kv),
            _ => None,
        }
    }

    pub fn as_key_value_mut(&mut self) -> Option<&mut KeyValue> {
        match self {
            Entry::KeyValue(kv) => Some(kv),
            _ => None,
        }
    }
}

impl From<KeyValue> for Entry {
    fn from(kv: KeyValue) -> Self {
        Entry::KeyValue(kv)
    }
}

/// A single variable assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Variable name.
    pub key: String,
    /// Decoded value (quotes removed, escapes resolved).
    pub value: String,
    /// Trailing comment on the same line, `#` included.
    pub inline_comment: Option<String>,
    /// The line carried an `export ` prefix.
    pub exported: bool,
    /// Key name looks like it holds a credential. Computed once at construction.
    pub is_secret: bool,
    /// The value was quoted in the source text.
    pub quoted: bool,
    /// 1-based source line number.
    pub line: usize,
}

impl KeyValue {
    /// Build an unquoted, non-exported entry, classifying the key as secret or not.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let is_secret = parser::is_secret_key(&key);
        Self {
            key,
            value: value.into(),
            inline_comment: None,
            exported: false,
            is_secret,
            quoted: false,
            line: 0,
        }
    }

    pub fn with_exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    /// Coarse grouping used in listings.
    pub fn category(&self) -> &'static str {
        const GROUPS: [(&str, &[&str]); 3] = [
            ("database", &["DB_", "DATABASE_"]),
            ("aws", &["AWS_", "S3_"]),
            ("api", &["API_", "HTTP_"]),
        ];
        for (name, prefixes) in GROUPS {
            if prefixes.iter().any(|p| self.key.starts_with(p)) {
                return name;
            }
        }
        if self.is_secret { "secret" } else { "other" }
    }
}

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Error,
    Warning,
}

/// A single finding from [`crate::model::EnvFile::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub level: ValidationLevel,
    pub message: String,
    /// Line of the offending entry.
    pub line: usize,
    /// Key of the offending entry (empty when the key itself is missing).
    pub key: String,
}

/// Per-key outcome of comparing two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    Same,
    Different,
    OnlyInCurrent,
    OnlyInOther,
}

/// One key of a [`FileComparison`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyComparison {
    pub key: String,
    /// Value in the current document, if present there.
    pub current: Option<String>,
    /// Value in the other document, if present there.
    pub other: Option<String>,
}

impl KeyComparison {
    pub fn status(&self) -> KeyStatus {
        match (&self.current, &self.other) {
            (Some(a), Some(b)) if a == b => KeyStatus::Same,
            (Some(_), Some(_)) => KeyStatus::Different,
            (Some(_), None) => KeyStatus::OnlyInCurrent,
            _ => KeyStatus::OnlyInOther,
        }
    }
}

/// Result of comparing two documents key by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileComparison {
    /// File name of the other document.
    pub other_file: String,
    /// Union of keys: current document order first, then keys only in the other.
    pub keys: Vec<KeyComparison>,
    /// Distinct keys in the current document.
    pub total_keys: usize,
    pub matching: usize,
    pub different: usize,
    pub only_in_current: usize,
    pub only_in_other: usize,
}

impl FileComparison {
    pub fn has_differences(&self) -> bool {
        self.different > 0 || self.only_in_current > 0 || self.only_in_other > 0
    }
}

/// A backup file found next to a document. Derived from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub timestamp: NaiveDateTime,
    pub size: u64,
    /// Safety copy taken before a restore.
    pub pre_restore: bool,
}

/// Git state of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitStatus {
    /// Not inside a git repository.
    NotInRepo,
    Untracked,
    Ignored,
    Modified,
    Staged,
    Clean,
}

impl GitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotInRepo => "not in repo",
            Self::Untracked => "untracked",
            Self::Ignored => "ignored",
            Self::Modified => "modified",
            Self::Staged => "staged",
            Self::Clean => "clean",
        }
    }
}
