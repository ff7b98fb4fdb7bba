use std::io::{self, IsTerminal};

use colored::Colorize;
use comfy_table::{Table, presets};

use crate::history::ChangeStack;
use crate::types::{BackupInfo, FileComparison, KeyStatus, ValidationIssue, ValidationLevel};

/// Check if stdout is a terminal (vs piped).
pub fn is_stdout_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Abbreviate a hash for display, git-style: "abcdef1234..." -> "abcdef12"
pub fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

/// Format a comparison as human-readable text with colors.
///
/// The other file is treated as the old side: `-` lines come from it, `+`
/// lines from the current file.
pub fn format_comparison_text(cmp: &FileComparison, full: bool) -> String {
    let mut out = String::new();

    for k in &cmp.keys {
        let current = k.current.as_deref().unwrap_or_default();
        let other = k.other.as_deref().unwrap_or_default();
        match k.status() {
            KeyStatus::OnlyInOther => {
                out.push_str(&format!("{}\n", format!("- {}={other}", k.key).red()));
            }
            KeyStatus::OnlyInCurrent => {
                out.push_str(&format!("{}\n", format!("+ {}={current}", k.key).green()));
            }
            KeyStatus::Different => {
                out.push_str(&format!("{}\n", format!("- {}={other}", k.key).red()));
                out.push_str(&format!("{}\n", format!("+ {}={current}", k.key).green()));
            }
            KeyStatus::Same if full => {
                out.push_str(&format!("{}\n", format!("  {}={current}", k.key).dimmed()));
            }
            KeyStatus::Same => {}
        }
    }

    let other_name = if cmp.other_file.is_empty() {
        "other"
    } else {
        cmp.other_file.as_str()
    };
    out.push_str(&format!(
        "{} matching, {} different, {} only here, {} only in {other_name}\n",
        cmp.matching, cmp.different, cmp.only_in_current, cmp.only_in_other
    ));

    out
}

/// Format a comparison as JSON.
pub fn format_comparison_json(cmp: &FileComparison, full: bool) -> crate::error::Result<String> {
    let keys: Vec<serde_json::Value> = cmp
        .keys
        .iter()
        .filter(|k| full || k.status() != KeyStatus::Same)
        .map(|k| {
            serde_json::json!({
                "key": k.key,
                "status": k.status(),
                "current": k.current,
                "other": k.other,
            })
        })
        .collect();

    let output = serde_json::json!({
        "other_file": cmp.other_file,
        "total_keys": cmp.total_keys,
        "matching": cmp.matching,
        "different": cmp.different,
        "only_in_current": cmp.only_in_current,
        "only_in_other": cmp.only_in_other,
        "keys": keys,
    });

    Ok(serde_json::to_string_pretty(&output)?)
}

/// Validation findings as a JSON array.
pub fn format_issues_json(issues: &[ValidationIssue]) -> crate::error::Result<String> {
    Ok(serde_json::to_string_pretty(issues)?)
}

/// One validation finding: `line 3: error: Duplicate key ...`.
pub fn format_issue(issue: &ValidationIssue) -> String {
    let level = match issue.level {
        ValidationLevel::Error => "error".red().bold(),
        ValidationLevel::Warning => "warning".yellow(),
    };
    format!("line {}: {level}: {}", issue.line, issue.message)
}

/// Numbered backup table, newest first.
pub fn format_backups(backups: &[BackupInfo]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(vec!["#", "Created", "Size", "Kind", "Path"]);

    for (i, backup) in backups.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            backup.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{} B", backup.size),
            if backup.pre_restore { "pre-restore" } else { "write" }.to_string(),
            backup.path.display().to_string(),
        ]);
    }

    table.to_string()
}

/// Change history, oldest first, with `>` on the most recently applied change.
/// Undone changes still available for redo are dimmed.
pub fn format_history(history: &ChangeStack) -> String {
    if history.is_empty() {
        return "No changes.\n".to_string();
    }

    let position = history.position();
    let mut out = String::new();
    for (i, change) in history.changes().enumerate() {
        let marker = if position == Some(i) { ">" } else { " " };
        let line = format!("{marker} {}. {}", i + 1, change.describe());
        match position {
            Some(p) if i <= p => out.push_str(&format!("{line}\n")),
            _ => out.push_str(&format!("{}\n", line.dimmed())),
        }
    }
    out
}
