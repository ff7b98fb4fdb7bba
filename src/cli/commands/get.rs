use std::path::Path;

use crate::error::{Error, Result};
use crate::persist;

/// Run the `get` command: print the raw value of the first matching key.
pub fn run(path: &Path, key: &str) -> Result<()> {
    let file = persist::read_file(path)?;
    let kv = file
        .get(key)
        .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
    println!("{}", kv.value);
    Ok(())
}
