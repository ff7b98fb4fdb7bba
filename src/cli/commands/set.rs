use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::history::Change;
use crate::session::Session;

/// Run the `set` command: update a variable in place or append it.
///
/// A missing file is created empty first.
pub fn run(path: &Path, key: &str, value: &str, export: bool, capacity: usize) -> Result<()> {
    if !path.exists() {
        std::fs::write(path, "")?;
        println!("Created {}.", path.display());
    }

    let mut session = Session::open(path, capacity)?;
    match session.set(key, value, export)? {
        Change::Add { .. } => println!("{}", format!("Added {key}.").green()),
        _ => println!("{}", format!("Updated {key}.").green()),
    }
    Ok(())
}
