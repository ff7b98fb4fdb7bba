use std::path::Path;

use crate::error::{Error, Result};
use crate::export::{self, Shell};
use crate::persist;

/// Run the `export` command: render variables as JSON, YAML or shell assignments.
pub fn run(path: &Path, format: &str, force_export: bool, out: Option<&Path>) -> Result<()> {
    let file = persist::read_file(path)?;

    let rendered = match format {
        "json" => {
            let mut json = export::to_json(&export::build(&file))?;
            json.push('\n');
            json
        }
        "yaml" => export::to_yaml(&export::build(&file))?,
        "bash" => export::to_shell(&file, Shell::Bash, force_export),
        "fish" => export::to_shell(&file, Shell::Fish, force_export),
        other => return Err(Error::Other(format!("Unknown export format: {other}"))),
    };

    match out {
        Some(dest) => {
            std::fs::write(dest, &rendered)?;
            eprintln!("Wrote {}.", dest.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
