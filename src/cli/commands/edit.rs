use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::cli::{self, output};
use crate::config::{Config, DisplayConfig};
use crate::error::{Error, Result};
use crate::persist::Filesystem;
use crate::session::Session;

const HELP: &str = "\
Commands:
  list [QUERY]      list variables, fuzzy-filtered
  get KEY           print a value
  set KEY VALUE     set a variable (added at the end when missing)
  export KEY VALUE  like set, but a new variable gets `export`
  unset KEY         remove a variable
  undo / redo       step through the change history
  history           show the change history
  diff              compare with the file as it was when opened
  validate          report issues
  reload            re-read the file and clear history
  help              show this help
  quit              leave
";

enum Flow {
    Continue,
    Quit,
}

/// Run the `edit` command: a line-oriented editing session on stdin.
///
/// Every change is written to disk immediately; undo and redo write too.
pub fn run(path: &Path, config: &Config) -> Result<()> {
    let mut session = Session::open(path, config.history.max_changes)?;
    println!(
        "Editing {} ({} variables). Type 'help' for commands.",
        path.display(),
        session.file().key_values().count()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("envedit> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        match execute(&mut session, line.trim(), &config.display, &mut stdout) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => eprintln!("{} {e}", "error:".red()),
        }
    }

    Ok(())
}

fn execute<F: Filesystem>(
    session: &mut Session<F>,
    line: &str,
    display: &DisplayConfig,
    out: &mut impl Write,
) -> Result<Flow> {
    let (command, args) = split_word(line);

    match command {
        "" => {}
        "list" | "ls" => {
            for kv in session.file().filter(args) {
                writeln!(out, "{}={}", kv.key, cli::display_value(kv, false, display))?;
            }
        }
        "get" => {
            let key = required(args, "get KEY")?;
            let kv = session
                .file()
                .get(key)
                .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
            writeln!(out, "{}", kv.value)?;
        }
        "set" | "export" => {
            let (key, value) = split_word(args);
            required(key, &format!("{command} KEY VALUE"))?;
            let change = session.set(key, value, command == "export")?;
            writeln!(out, "{}", change.describe())?;
        }
        "unset" => {
            let key = required(args, "unset KEY")?;
            let change = session
                .unset(key)?
                .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
            writeln!(out, "{}", change.describe())?;
        }
        "undo" => match session.undo()? {
            Some(change) => writeln!(out, "undid {}", change.describe())?,
            None => writeln!(out, "nothing to undo")?,
        },
        "redo" => match session.redo()? {
            Some(change) => writeln!(out, "redid {}", change.describe())?,
            None => writeln!(out, "nothing to redo")?,
        },
        "history" => write!(out, "{}", output::format_history(session.history()))?,
        "diff" => {
            let cmp = session.compare_with_original();
            write!(out, "{}", output::format_comparison_text(&cmp, false))?;
        }
        "validate" => {
            let issues = session.file().validate();
            if issues.is_empty() {
                writeln!(out, "no issues found")?;
            }
            for issue in &issues {
                writeln!(out, "{}", output::format_issue(issue))?;
            }
        }
        "reload" => {
            session.reload()?;
            writeln!(out, "reloaded")?;
        }
        "help" | "?" => write!(out, "{HELP}")?,
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        other => {
            return Err(Error::Other(format!(
                "unknown command '{other}', type 'help'"
            )));
        }
    }

    Ok(Flow::Continue)
}

/// Split off the first whitespace-separated word; the rest keeps inner spaces.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(Error::Other(format!("usage: {usage}")))
    } else {
        Ok(arg)
    }
}
