use std::path::Path;

use colored::Colorize;

use crate::cli::{self, output};
use crate::error::Result;
use crate::persist;

/// Run `backups list`.
pub fn list(path: &Path) -> Result<()> {
    let backups = persist::list_backups(path)?;
    if backups.is_empty() {
        println!("No backups of {}.", path.display());
        return Ok(());
    }
    println!("{}", output::format_backups(&backups));
    Ok(())
}

/// Run `backups restore`: copy a backup over the file after confirmation.
pub fn restore(path: &Path, reference: &str, force: bool) -> Result<()> {
    let backups = persist::list_backups(path)?;
    let backup = cli::resolve_backup(&backups, reference)?;

    if !force
        && !cli::confirm(&format!(
            "Restore {} over {}?",
            backup.display(),
            path.display()
        ))
    {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    persist::restore_backup(&backup, path)?;
    println!(
        "{}",
        format!("Restored {} from {}.", path.display(), backup.display())
            .green()
            .bold()
    );
    Ok(())
}

/// Run `backups delete`.
pub fn delete(path: &Path, reference: &str) -> Result<()> {
    let backups = persist::list_backups(path)?;
    let backup = cli::resolve_backup(&backups, reference)?;
    persist::delete_backup(&backup)?;
    println!("{}", format!("Deleted {}.", backup.display()).green());
    Ok(())
}
