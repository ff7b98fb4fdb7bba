use std::path::Path;

use colored::Colorize;

use crate::error::{Error, Result};
use crate::export;
use crate::model::EnvFile;
use crate::persist;

/// Run the `import` command: merge a JSON export into the file.
///
/// The target is created when it does not exist yet.
pub fn run(path: &Path, source: &Path, overwrite: bool) -> Result<()> {
    let input = std::fs::read_to_string(source).map_err(|e| Error::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let data = export::from_json(&input)?;

    let mut file = if path.exists() {
        persist::read_file(path)?
    } else {
        let mut file = EnvFile::default();
        file.set_path(path);
        file
    };

    let summary = export::merge(&mut file, &data.entries, overwrite)?;

    if summary.changed() {
        persist::write_file(&file)?;
    }

    println!(
        "{}",
        format!(
            "Imported {} new, {} updated.",
            summary.added.len(),
            summary.updated.len()
        )
        .green()
    );
    if !summary.skipped.is_empty() {
        let hint = if overwrite { "" } else { " (use --overwrite to replace)" };
        println!("Skipped {}: {}{hint}", summary.skipped.len(), summary.skipped.join(", "));
    }
    Ok(())
}
