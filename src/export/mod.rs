use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::EnvFile;
use crate::parser;
use crate::types::KeyValue;

/// JSON document produced by `export --format json` and read by `import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    /// File name the entries came from.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub count: usize,
    pub entries: Vec<ExportEntry>,
}

/// A single exported variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub is_secret: bool,
}

impl From<&KeyValue> for ExportEntry {
    fn from(kv: &KeyValue) -> Self {
        Self {
            key: kv.key.clone(),
            value: kv.value.clone(),
            exported: kv.exported,
            is_secret: kv.is_secret,
        }
    }
}

/// Target shell for `to_shell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Fish,
}

/// What `merge` did with each imported key.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    /// Keys already present and left alone (no overwrite, or same value).
    pub skipped: Vec<String>,
}

impl MergeSummary {
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty()
    }
}

/// Collect the effective variables of a document.
///
/// Only the first occurrence of a duplicated key is exported, since that is
/// the value every key lookup sees.
pub fn build(file: &EnvFile) -> ExportData {
    let entries: Vec<ExportEntry> = effective(file).map(ExportEntry::from).collect();
    ExportData {
        file: file
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        count: entries.len(),
        entries,
    }
}

pub fn to_json(data: &ExportData) -> Result<String> {
    serde_json::to_string_pretty(data).map_err(Error::from)
}

pub fn from_json(input: &str) -> Result<ExportData> {
    serde_json::from_str(input).map_err(Error::from)
}

/// Render the export document as YAML.
///
/// Strings are written as double-quoted scalars. A JSON string literal is a
/// valid YAML double-quoted scalar, so `serde_json` does the escaping.
pub fn to_yaml(data: &ExportData) -> Result<String> {
    let mut out = format!("file: {}\ncount: {}\n", yaml_str(&data.file)?, data.count);
    if data.entries.is_empty() {
        out.push_str("entries: []\n");
        return Ok(out);
    }

    out.push_str("entries:\n");
    for entry in &data.entries {
        out.push_str(&format!("  - key: {}\n", yaml_str(&entry.key)?));
        out.push_str(&format!("    value: {}\n", yaml_str(&entry.value)?));
        out.push_str(&format!("    exported: {}\n", entry.exported));
        out.push_str(&format!("    is_secret: {}\n", entry.is_secret));
    }
    Ok(out)
}

fn yaml_str(s: &str) -> Result<String> {
    serde_json::to_string(s).map_err(Error::from)
}

/// Merge imported entries into `file`.
///
/// Missing keys are appended. Existing keys are only changed when
/// `overwrite` is set, in which case both the value and the `export` flag are
/// taken from the import. All keys are checked before anything is touched.
pub fn merge(
    file: &mut EnvFile,
    entries: &[ExportEntry],
    overwrite: bool,
) -> Result<MergeSummary> {
    if let Some(bad) = entries.iter().find(|e| !parser::is_valid_key(&e.key)) {
        return Err(Error::InvalidKey(bad.key.clone()));
    }

    let mut summary = MergeSummary::default();
    for entry in entries {
        match file.get(&entry.key) {
            None => {
                let kv = KeyValue::new(&entry.key, &entry.value).with_exported(entry.exported);
                file.add(kv.into());
                summary.added.push(entry.key.clone());
            }
            Some(kv)
                if overwrite && (kv.value != entry.value || kv.exported != entry.exported) =>
            {
                file.update(&entry.key, entry.value.as_str());
                file.set_exported(&entry.key, entry.exported);
                summary.updated.push(entry.key.clone());
            }
            Some(_) => summary.skipped.push(entry.key.clone()),
        }
    }

    tracing::debug!(
        added = summary.added.len(),
        updated = summary.updated.len(),
        skipped = summary.skipped.len(),
        "merged import"
    );
    Ok(summary)
}

/// Render the effective variables as shell assignments.
///
/// Entries without `export` become plain assignments unless `force_export`
/// is set.
pub fn to_shell(file: &EnvFile, shell: Shell, force_export: bool) -> String {
    let mut out = String::new();
    for kv in effective(file) {
        let export = force_export || kv.exported;
        let line = match (shell, export) {
            (Shell::Bash, true) => format!("export {}='{}'", kv.key, escape_bash(&kv.value)),
            (Shell::Bash, false) => format!("{}='{}'", kv.key, escape_bash(&kv.value)),
            (Shell::Fish, true) => format!("set -x {} '{}'", kv.key, escape_fish(&kv.value)),
            (Shell::Fish, false) => format!("set {} '{}'", kv.key, escape_fish(&kv.value)),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn effective(file: &EnvFile) -> impl Iterator<Item = &KeyValue> {
    let mut seen = HashSet::new();
    file.key_values().filter(move |kv| seen.insert(kv.key.as_str()))
}

/// Bash single quotes cannot contain `'`, so close, escape and reopen: `'\''`.
fn escape_bash(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Fish single quotes accept `\'` and `\\`.
fn escape_fish(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
