use std::path::Path;

use crate::cli::output;
use crate::error::Result;
use crate::git;
use crate::persist;
use crate::types::Entry;

/// Run the `info` command: summary of the file, its git state and backups.
pub fn run(path: &Path) -> Result<()> {
    let file = persist::read_file(path)?;

    let comments = file
        .entries()
        .iter()
        .filter(|e| matches!(e, Entry::Comment { .. }))
        .count();
    let variables = file.key_values().count();
    let secrets = file.key_values().filter(|kv| kv.is_secret).count();
    let exported = file.key_values().filter(|kv| kv.exported).count();
    let size = std::fs::metadata(path)?.len();

    println!("File:      {}", path.display());
    println!("Size:      {size} bytes");
    if let Some(hash) = file.loaded_hash() {
        println!("SHA-256:   {}", output::short_hash(hash));
    }
    println!("Variables: {variables} ({secrets} secret, {exported} exported)");
    println!("Comments:  {comments}");

    let status = git::file_status(path)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    match git::branch(dir)? {
        Some(branch) => println!("Git:       {} on {branch}", status.as_str()),
        None => println!("Git:       {}", status.as_str()),
    }

    let backups = persist::list_backups(path)?;
    match backups.first() {
        Some(latest) => println!(
            "Backups:   {} (latest {})",
            backups.len(),
            latest.timestamp.format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("Backups:   none"),
    }

    Ok(())
}
