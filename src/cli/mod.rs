pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{self, DisplayConfig};
use crate::error::{Error, Result};
use crate::types::{BackupInfo, KeyValue};

#[derive(Parser)]
#[command(
    name = "envedit",
    version,
    about = "Inspect and edit .env files safely",
    help_template = "\
{about-with-newline}
{usage-heading} {usage}

Inspect:
  list         List variables (secrets masked)
  get          Print one value
  validate     Report duplicate keys and suspicious values
  compare      Compare against another .env file
  info         Show file, git and backup details

Edit:
  set          Set a variable (adds it when missing)
  unset        Remove a variable
  fmt          Normalize formatting
  import       Merge variables from a JSON export
  edit         Interactive session with undo/redo

Export & Backups:
  export       Print as JSON, YAML or shell assignments
  backups      List, restore or delete backups
  completions  Print shell completions

Options:
{options}{after-help}"
)]
pub struct Cli {
    /// Path to the .env file
    #[arg(short, long, global = true, default_value = ".env")]
    pub file: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List variables (secrets masked)
    List {
        /// Fuzzy filter on key or value
        query: Option<String>,
        /// Show secret values
        #[arg(long)]
        reveal: bool,
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        output: String,
    },

    /// Print one value
    Get {
        key: String,
    },

    /// Set a variable (adds it when missing)
    Set {
        key: String,
        value: String,
        /// Prefix a newly added variable with `export`
        #[arg(long)]
        export: bool,
    },

    /// Remove a variable
    Unset {
        key: String,
    },

    /// Report duplicate keys and suspicious values
    Validate {
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        output: String,
    },

    /// Compare against another .env file
    Compare {
        /// The other file
        other: PathBuf,
        /// Show matching variables too
        #[arg(long)]
        full: bool,
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        output: String,
    },

    /// Normalize formatting
    Fmt {
        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },

    /// Print as JSON, YAML or shell assignments
    Export {
        /// Format: json, yaml, bash or fish
        #[arg(long, default_value = "json")]
        format: String,
        /// Export every variable, not only those marked `export`
        #[arg(long)]
        exports: bool,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Merge variables from a JSON export
    Import {
        /// JSON file produced by `export --format json`
        source: PathBuf,
        /// Replace values of keys that already exist
        #[arg(long)]
        overwrite: bool,
    },

    /// List, restore or delete backups
    Backups {
        #[command(subcommand)]
        command: BackupCommands,
    },

    /// Show file, git and backup details
    Info,

    /// Interactive session with undo/redo
    Edit,

    /// Print shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// List backups, newest first
    List,
    /// Restore a backup (number from `backups list`, or a path)
    Restore {
        backup: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Delete a backup (number from `backups list`, or a path)
    Delete {
        backup: String,
    },
}

/// Run the selected command.
pub fn run(cli: Cli) -> Result<()> {
    // Disable ANSI colors when stdout is not a terminal (piped/redirected).
    if !output::is_stdout_terminal() {
        colored::control::set_override(false);
    }

    if let Commands::Completions { shell } = cli.command {
        return commands::completions::run(shell, &mut std::io::stdout());
    }

    let config = config::load();
    let path = cli.file.as_path();

    match cli.command {
        Commands::List {
            query,
            reveal,
            output,
        } => commands::list::run(path, query.as_deref(), reveal, &output, &config.display),
        Commands::Get { key } => commands::get::run(path, &key),
        Commands::Set { key, value, export } => {
            commands::set::run(path, &key, &value, export, config.history.max_changes)
        }
        Commands::Unset { key } => commands::unset::run(path, &key, config.history.max_changes),
        Commands::Validate { output } => commands::validate::run(path, &output),
        Commands::Compare {
            other,
            full,
            output,
        } => commands::compare::run(path, &other, full, &output),
        Commands::Fmt { write } => commands::fmt::run(path, write),
        Commands::Export {
            format,
            exports,
            out,
        } => commands::export::run(path, &format, exports, out.as_deref()),
        Commands::Import { source, overwrite } => commands::import::run(path, &source, overwrite),
        Commands::Backups { command } => match command {
            BackupCommands::List => commands::backups::list(path),
            BackupCommands::Restore { backup, force } => {
                commands::backups::restore(path, &backup, force)
            }
            BackupCommands::Delete { backup } => commands::backups::delete(path, &backup),
        },
        Commands::Info => commands::info::run(path),
        Commands::Edit => commands::edit::run(path, &config),
        Commands::Completions { .. } => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Shared CLI helpers
// ---------------------------------------------------------------------------

/// Prompt the user for yes/no confirmation on stderr.
pub fn confirm(prompt: &str) -> bool {
    use std::io::Write;
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush().ok();
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).ok();
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Value as it should be shown to the user: masked when secret, unless revealed.
pub fn display_value(kv: &KeyValue, reveal: bool, display: &DisplayConfig) -> String {
    if kv.is_secret && display.mask_secrets && !reveal {
        display.mask.clone()
    } else {
        kv.value.clone()
    }
}

/// Pick a backup by its 1-based number in `backups` (newest first) or by path.
pub fn resolve_backup(backups: &[BackupInfo], reference: &str) -> Result<PathBuf> {
    if let Ok(n) = reference.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| backups.get(i))
            .map(|b| b.path.clone())
            .ok_or_else(|| {
                Error::Other(format!(
                    "no backup #{n} ({} available)",
                    backups.len()
                ))
            });
    }

    let path = Path::new(reference);
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(Error::FileNotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn backup(name: &str) -> BackupInfo {
        BackupInfo {
            path: PathBuf::from(name),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            size: 1,
            pre_restore: false,
        }
    }

    #[test]
    fn secret_is_masked_unless_revealed() {
        let display = DisplayConfig::default();
        let kv = KeyValue::new("API_TOKEN", "abc");
        assert_eq!(display_value(&kv, false, &display), display.mask);
        assert_eq!(display_value(&kv, true, &display), "abc");
    }

    #[test]
    fn plain_value_is_never_masked() {
        let display = DisplayConfig::default();
        let kv = KeyValue::new("PORT", "80");
        assert_eq!(display_value(&kv, false, &display), "80");
    }

    #[test]
    fn masking_can_be_disabled() {
        let display = DisplayConfig {
            mask_secrets: false,
            ..DisplayConfig::default()
        };
        let kv = KeyValue::new("API_TOKEN", "abc");
        assert_eq!(display_value(&kv, false, &display), "abc");
    }

    #[test]
    fn resolve_backup_by_number() {
        let backups = vec![backup("newest"), backup("older")];
        assert_eq!(resolve_backup(&backups, "2").unwrap(), PathBuf::from("older"));
        assert!(resolve_backup(&backups, "0").is_err());
        assert!(resolve_backup(&backups, "3").is_err());
    }

    #[test]
    fn resolve_backup_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env.backup.20240101-000000");
        std::fs::write(&path, "A=1\n").unwrap();
        let reference = path.to_string_lossy().to_string();

        assert_eq!(resolve_backup(&[], &reference).unwrap(), path);
        assert!(matches!(
            resolve_backup(&[], "/nonexistent/backup").unwrap_err(),
            Error::FileNotFound(_)
        ));
    }

    #[test]
    fn cli_parses_global_file() {
        let cli = Cli::parse_from(["envedit", "-f", "app.env", "get", "PORT"]);
        assert_eq!(cli.file, PathBuf::from("app.env"));
        assert!(matches!(cli.command, Commands::Get { ref key } if key == "PORT"));
    }

    #[test]
    fn cli_parses_backup_restore() {
        let cli = Cli::parse_from(["envedit", "backups", "restore", "1", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Backups {
                command: BackupCommands::Restore { ref backup, force: true }
            } if backup == "1"
        ));
        assert_eq!(cli.file, PathBuf::from(".env"));
    }

    #[test]
    fn cli_parses_completions_and_yaml() {
        let cli = Cli::parse_from(["envedit", "completions", "fish"]);
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Fish }
        ));

        let cli = Cli::parse_from(["envedit", "export", "--format", "yaml"]);
        assert!(matches!(cli.command, Commands::Export { ref format, .. } if format == "yaml"));

        let cli = Cli::parse_from(["envedit", "validate", "--output", "json"]);
        assert!(matches!(cli.command, Commands::Validate { ref output } if output == "json"));
    }
}
