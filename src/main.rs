pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod history;
pub mod model;
pub mod parser;
pub mod persist;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_helpers;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = cli::run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr. `ENVEDIT_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "envedit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ENVEDIT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
