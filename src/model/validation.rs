use std::collections::HashMap;

use crate::model::EnvFile;
use crate::types::{KeyValue, ValidationIssue, ValidationLevel};

/// Secret values that are almost certainly placeholders.
const PLACEHOLDER_SECRETS: [&str; 3] = ["", "changeme", "password"];

impl EnvFile {
    /// Check every entry, then scan for duplicate keys.
    ///
    /// Issues come back in document order. Duplicates are reported on each
    /// later occurrence and point at the line where the key first appeared.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut first_seen: HashMap<&str, usize> = HashMap::new();

        for kv in self.key_values() {
            issues.extend(validate_entry(kv));

            match first_seen.get(kv.key.as_str()) {
                Some(&first_line) => issues.push(ValidationIssue {
                    level: ValidationLevel::Error,
                    message: format!(
                        "Duplicate key '{}' (first seen at line {first_line})",
                        kv.key
                    ),
                    line: kv.line,
                    key: kv.key.clone(),
                }),
                None => {
                    first_seen.insert(&kv.key, kv.line);
                }
            }
        }

        issues
    }
}

fn validate_entry(kv: &KeyValue) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if kv.key.is_empty() {
        issues.push(ValidationIssue {
            level: ValidationLevel::Error,
            message: "Key cannot be empty".to_string(),
            line: kv.line,
            key: String::new(),
        });
    }

    if !kv.quoted && !kv.exported && kv.value.contains(' ') {
        issues.push(ValidationIssue {
            level: ValidationLevel::Warning,
            message: format!("Value contains spaces, consider quoting: {}", kv.key),
            line: kv.line,
            key: kv.key.clone(),
        });
    }

    if kv.is_secret && PLACEHOLDER_SECRETS.contains(&kv.value.as_str()) {
        issues.push(ValidationIssue {
            level: ValidationLevel::Warning,
            message: format!("Suspicious secret value: {}", kv.key),
            line: kv.line,
            key: kv.key.clone(),
        });
    }

    issues
}
