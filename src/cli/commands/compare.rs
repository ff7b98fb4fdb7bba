use std::path::Path;

use crate::cli::output;
use crate::error::{Error, Result};
use crate::persist;

/// Run the `compare` command: key-by-key comparison with another file.
pub fn run(path: &Path, other: &Path, full: bool, output_format: &str) -> Result<()> {
    let current = persist::read_file(path)?;
    let other = persist::read_file(other)?;
    let cmp = current.compare(&other);

    match output_format {
        "json" => println!("{}", output::format_comparison_json(&cmp, full)?),
        "text" => print!("{}", output::format_comparison_text(&cmp, full)),
        other => return Err(Error::Other(format!("Unknown output format: {other}"))),
    }
    Ok(())
}
