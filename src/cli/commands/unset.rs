use std::path::Path;

use colored::Colorize;

use crate::error::{Error, Result};
use crate::session::Session;

/// Run the `unset` command: remove the first entry with `key`.
pub fn run(path: &Path, key: &str, capacity: usize) -> Result<()> {
    let mut session = Session::open(path, capacity)?;
    if session.unset(key)?.is_none() {
        return Err(Error::KeyNotFound(key.to_string()));
    }
    println!("{}", format!("Removed {key}.").green());
    Ok(())
}
