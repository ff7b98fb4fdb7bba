use std::path::Path;

use colored::Colorize;

use crate::error::Result;
use crate::parser;
use crate::persist;

/// Run the `fmt` command: print the normalized file, or write it back.
///
/// Writing goes through the normal backup-then-replace path and is skipped
/// when the file is already normalized.
pub fn run(path: &Path, write: bool) -> Result<()> {
    let file = persist::read_file(path)?;
    let formatted = parser::serialize(&file);

    if !write {
        print!("{formatted}");
        return Ok(());
    }

    if file.loaded_hash() == Some(parser::content_hash(&formatted).as_str()) {
        println!("{} is already formatted.", path.display());
        return Ok(());
    }

    persist::write_file(&file)?;
    println!("{}", format!("Formatted {}.", path.display()).green());
    Ok(())
}
