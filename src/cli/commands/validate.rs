use std::path::Path;

use colored::Colorize;

use crate::cli::output;
use crate::error::{Error, Result};
use crate::persist;
use crate::types::ValidationLevel;

/// Run the `validate` command. Fails when any error-level issue is found.
pub fn run(path: &Path, output_format: &str) -> Result<()> {
    let file = persist::read_file(path)?;
    let issues = file.validate();
    let errors = issues
        .iter()
        .filter(|i| i.level == ValidationLevel::Error)
        .count();

    match output_format {
        "json" => {
            println!("{}", output::format_issues_json(&issues)?);
            return if errors > 0 {
                Err(Error::Validation(errors))
            } else {
                Ok(())
            };
        }
        "text" => {}
        other => return Err(Error::Other(format!("Unknown output format: {other}"))),
    }

    if issues.is_empty() {
        println!("{}", format!("{}: no issues found.", path.display()).green());
        return Ok(());
    }

    for issue in &issues {
        println!("{}", output::format_issue(issue));
    }

    let warnings = issues.len() - errors;
    println!("{errors} error(s), {warnings} warning(s).");

    if errors > 0 {
        return Err(Error::Validation(errors));
    }
    Ok(())
}
