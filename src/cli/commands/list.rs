use std::path::Path;

use colored::Colorize;
use comfy_table::{Table, presets};

use crate::cli;
use crate::config::DisplayConfig;
use crate::error::{Error, Result};
use crate::git;
use crate::persist;
use crate::types::KeyValue;

/// Run the `list` command: show variables, optionally fuzzy-filtered.
pub fn run(
    path: &Path,
    query: Option<&str>,
    reveal: bool,
    output_format: &str,
    display: &DisplayConfig,
) -> Result<()> {
    let file = persist::read_file(path)?;
    let matches = file.filter(query.unwrap_or(""));

    match output_format {
        "json" => {
            println!("{}", format_json(&matches, reveal, display)?);
            return Ok(());
        }
        "text" => {}
        other => return Err(Error::Other(format!("Unknown output format: {other}"))),
    }

    let status = git::file_status(path)?;
    println!("-> {} ({})", path.display(), status.as_str());

    if matches.is_empty() {
        match query {
            Some(q) => println!("No variables match '{q}'."),
            None => println!("No variables."),
        }
        return Ok(());
    }

    println!("{}", format_table(&matches, reveal, display));
    Ok(())
}

fn format_table(entries: &[&KeyValue], reveal: bool, display: &DisplayConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(vec!["Key", "Value", "Category", "Line"]);

    for kv in entries {
        let key = if kv.exported {
            format!("export {}", kv.key)
        } else {
            kv.key.clone()
        };
        let value = cli::display_value(kv, reveal, display);
        let value = if kv.is_secret && !reveal {
            value.dimmed().to_string()
        } else {
            value
        };
        table.add_row(vec![key, value, kv.category().to_string(), kv.line.to_string()]);
    }

    table
}

fn format_json(entries: &[&KeyValue], reveal: bool, display: &DisplayConfig) -> Result<String> {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|kv| {
            serde_json::json!({
                "key": kv.key,
                "value": cli::display_value(kv, reveal, display),
                "exported": kv.exported,
                "is_secret": kv.is_secret,
                "category": kv.category(),
                "line": kv.line,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&items)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn json_masks_secrets() {
        colored::control::set_override(false);
        let file = parse("DB_PASSWORD=hunter2\nPORT=80\n");
        let entries = file.filter("");
        let display = DisplayConfig::default();

        let parsed: serde_json::Value =
            serde_json::from_str(&format_json(&entries, false, &display).unwrap()).unwrap();
        assert_eq!(parsed[0]["value"], display.mask.as_str());
        assert_eq!(parsed[0]["category"], "database");
        assert_eq!(parsed[1]["value"], "80");

        let revealed: serde_json::Value =
            serde_json::from_str(&format_json(&entries, true, &display).unwrap()).unwrap();
        assert_eq!(revealed[0]["value"], "hunter2");
    }

    #[test]
    fn table_shows_export_prefix() {
        colored::control::set_override(false);
        let file = parse("export NODE_ENV=production\n");
        let table = format_table(&file.filter(""), false, &DisplayConfig::default()).to_string();
        assert!(table.contains("export NODE_ENV"));
        assert!(table.contains("production"));
        assert!(table.contains("other"));
    }
}
