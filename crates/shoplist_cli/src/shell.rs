//! Interactive line-oriented shell.

use crate::app::{App, Flow, Intent};
use std::io::{self, BufRead, Write};

pub const HELP: &str = "\
commands:
  add <name>            add an item
  toggle <n>            flip bought for item n
  edit <n>              rename item n (asks for the new name)
  rename <n> <name>     rename item n directly
  delete <n>            delete item n
  refresh               reload from disk
  list                  show the list
  help                  show this help
  quit                  leave the shell
";

/// Parses one shell line into an intent.
pub fn parse_intent(line: &str) -> Result<Intent, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "" | "list" | "ls" => Ok(Intent::List),
        "add" | "a" => Ok(Intent::Add(rest.to_string())),
        "toggle" | "t" => parse_position(rest).map(Intent::Toggle),
        "edit" | "e" => parse_position(rest).map(Intent::BeginEdit),
        "rename" => {
            let (position, name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: rename <n> <name>".to_string())?;
            Ok(Intent::Rename(parse_position(position)?, name.to_string()))
        }
        "delete" | "del" | "rm" => parse_position(rest).map(Intent::Delete),
        "refresh" | "r" => Ok(Intent::Refresh),
        "help" | "?" => Ok(Intent::Help),
        "quit" | "exit" | "q" => Ok(Intent::Quit),
        other => Err(format!("unknown command `{other}`; type `help`")),
    }
}

fn parse_position(value: &str) -> Result<usize, String> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("expected an item number, got `{}`", value.trim()))
}

/// Runs the shell until `quit` or end of input.
pub fn run_shell(app: &mut App, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    write!(output, "{}", app.render())?;
    prompt(app, &mut output)?;

    for line in input.lines() {
        let line = line?;
        let intent = if app.view().editing().is_some() {
            Intent::SubmitEdit(line)
        } else {
            match parse_intent(&line) {
                Ok(intent) => intent,
                Err(message) => {
                    writeln!(output, "! {message}")?;
                    prompt(app, &mut output)?;
                    continue;
                }
            }
        };

        let show_help = intent == Intent::Help;
        if app.dispatch(intent) == Flow::Quit {
            break;
        }
        if show_help {
            write!(output, "{HELP}")?;
        } else {
            write!(output, "{}", app.render())?;
        }
        prompt(app, &mut output)?;
    }

    output.flush()
}

fn prompt(app: &App, output: &mut impl Write) -> io::Result<()> {
    let marker = if app.view().editing().is_some() { "edit" } else { "shoplist" };
    write!(output, "{marker}> ")?;
    output.flush()
}
