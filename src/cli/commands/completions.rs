use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::Cli;
use crate::error::Result;

/// Run the `completions` command: write a completion script for `shell`.
pub fn run(shell: Shell, out: &mut impl Write) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut out = Vec::new();
        run(shell, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn bash_script_names_subcommands() {
        let out = script(Shell::Bash);
        assert!(out.contains("envedit"));
        assert!(out.contains("backups"));
        assert!(out.contains("completions"));
    }

    #[test]
    fn fish_script_registers_binary() {
        let out = script(Shell::Fish);
        assert!(out.contains("complete -c envedit"));
    }
}
