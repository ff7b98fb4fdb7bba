pub mod value;

use sha2::{Digest, Sha256};

use crate::model::EnvFile;
use crate::types::{Entry, KeyValue};

/// Substrings that mark a key as holding a credential (matched case-insensitively).
const SECRET_KEYWORDS: [&str; 9] = [
    "PASSWORD",
    "SECRET",
    "TOKEN",
    "KEY",
    "PRIVATE",
    "API_KEY",
    "AUTH",
    "CREDENTIAL",
    "CERT",
];

/// Parse a .env file's contents into a document.
///
/// Rules:
/// - Whitespace-only lines become `Blank` entries.
/// - Lines starting with `#` become `Comment` entries, text kept verbatim.
/// - `KEY=VALUE` and `export KEY=VALUE` become `KeyValue` entries. Quoted
///   values may span several lines.
/// - Anything else (no `=`, or an invalid key) is dropped.
///
/// Never fails: malformed lines degrade to nothing rather than to an error.
pub fn parse(input: &str) -> EnvFile {
    let lines: Vec<&str> = input.lines().collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let line_no = i + 1;
        i += 1;

        let trimmed = line.trim_start();

        if trimmed.trim_end().is_empty() {
            entries.push(Entry::Blank { line: line_no });
            continue;
        }

        if trimmed.starts_with('#') {
            entries.push(Entry::Comment {
                text: line.to_string(),
                line: line_no,
            });
            continue;
        }

        let (rest, exported) = match trimmed.strip_prefix("export ") {
            Some(rest) => (rest.trim_start(), true),
            None => (trimmed, false),
        };

        let Some((lhs, rhs)) = rest.split_once('=') else {
            tracing::debug!(line = line_no, "skipping line without '='");
            continue;
        };

        let key = lhs.trim();
        if !is_valid_key(key) {
            tracing::debug!(line = line_no, key, "skipping line with invalid key");
            continue;
        }

        let read = value::read_value(rhs, &lines[i..]);
        i += read.lines_consumed;

        entries.push(Entry::KeyValue(KeyValue {
            key: key.to_string(),
            value: read.value,
            inline_comment: read.inline_comment,
            exported,
            is_secret: is_secret_key(key),
            quoted: read.quoted,
            line: line_no,
        }));
    }

    EnvFile::from_entries(entries)
}

/// Keys are ASCII identifiers: a letter or `_`, then letters, digits or `_`.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether a key name suggests its value is a credential.
pub fn is_secret_key(key: &str) -> bool {
    let upper = key.to_uppercase();
    SECRET_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

/// Render one entry as a single line of text (no trailing newline).
pub fn render_entry(entry: &Entry) -> String {
    match entry {
        Entry::KeyValue(kv) => {
            let mut out = String::new();
            if kv.exported {
                out.push_str("export ");
            }
            out.push_str(&kv.key);
            out.push('=');
            out.push_str(&value::render_value(&kv.value, kv.quoted));
            if let Some(ref comment) = kv.inline_comment {
                out.push(' ');
                if !comment.starts_with('#') {
                    out.push_str("# ");
                }
                out.push_str(comment);
            }
            out
        }
        Entry::Comment { text, .. } => text.clone(),
        Entry::Blank { .. } => String::new(),
    }
}

/// Serialize a document back to .env text. Every line, the last included,
/// ends with a newline.
pub fn serialize(file: &EnvFile) -> String {
    let mut out = String::new();
    for entry in file.entries() {
        out.push_str(&render_entry(entry));
        out.push('\n');
    }
    out
}

/// SHA-256 of the given text, lowercase hex.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
