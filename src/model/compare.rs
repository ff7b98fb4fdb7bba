use std::collections::HashSet;

use crate::model::EnvFile;
use crate::types::{FileComparison, KeyComparison, KeyStatus};

impl EnvFile {
    /// Compare this document with `other` over the union of their keys.
    ///
    /// For duplicated keys only the first occurrence counts, matching what
    /// `get` would return.
    pub fn compare(&self, other: &EnvFile) -> FileComparison {
        let current = first_values(self);
        let theirs = first_values(other);

        let mut keys: Vec<KeyComparison> = current
            .iter()
            .map(|&(key, value)| KeyComparison {
                key: key.to_string(),
                current: Some(value.to_string()),
                other: other.get(key).map(|kv| kv.value.clone()),
            })
            .collect();

        let known: HashSet<&str> = current.iter().map(|&(k, _)| k).collect();
        keys.extend(
            theirs
                .iter()
                .filter(|(k, _)| !known.contains(k))
                .map(|&(key, value)| KeyComparison {
                    key: key.to_string(),
                    current: None,
                    other: Some(value.to_string()),
                }),
        );

        let count = |status: KeyStatus| keys.iter().filter(|k| k.status() == status).count();
        let matching = count(KeyStatus::Same);
        let different = count(KeyStatus::Different);
        let only_in_current = count(KeyStatus::OnlyInCurrent);
        let only_in_other = count(KeyStatus::OnlyInOther);

        FileComparison {
            other_file: other
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            total_keys: current.len(),
            matching,
            different,
            only_in_current,
            only_in_other,
            keys,
        }
    }
}

/// Distinct keys with their first value, in document order.
fn first_values(file: &EnvFile) -> Vec<(&str, &str)> {
    let mut seen = HashSet::new();
    file.key_values()
        .filter(|kv| seen.insert(kv.key.as_str()))
        .map(|kv| (kv.key.as_str(), kv.value.as_str()))
        .collect()
}
