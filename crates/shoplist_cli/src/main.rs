//! `shoplist` command-line entry point.
//!
//! # Responsibility
//! - Parse flags, start logging, open the store once and wire the controller.
//! - Run one subcommand, or the interactive shell when none is given.

mod app;
mod config;
mod shell;
mod view;

use app::{App, Intent};
use clap::Parser;
use config::{absolute_log_dir, resolve_db_path, Cli, Command, DB_PATH_ENV};
use log::{error, info};
use shoplist_core::db::open_db;
use shoplist_core::{default_log_level, init_logging, spawn_store_worker, ListController};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = start_logging(&cli) {
        eprintln!("shoplist: {message}");
        return ExitCode::FAILURE;
    }

    let db_path = resolve_db_path(cli.db.clone(), std::env::var(DB_PATH_ENV).ok());
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("shoplist: cannot open {}: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };
    let store = match spawn_store_worker(conn) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("shoplist: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        db_path.display()
    );

    let mut app = App::start(ListController::new(store));
    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let stdin = io::stdin();
            match shell::run_shell(&mut app, stdin.lock(), io::stdout()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("event=shell module=cli status=error error={err}");
                    eprintln!("shoplist: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        command => run_once(&mut app, command, cli.json),
    }
}

fn run_once(app: &mut App, command: Command, json: bool) -> ExitCode {
    let intent = match command {
        Command::List | Command::Shell => Intent::List,
        Command::Add { name } => Intent::Add(name.join(" ")),
        Command::Toggle { position } => Intent::Toggle(position),
        Command::Edit { position, name } => Intent::Rename(position, name.join(" ")),
        Command::Delete { position } => Intent::Delete(position),
    };

    match app.run_once(intent, json) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("shoplist: {message}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(cli: &Cli) -> Result<(), String> {
    let Some(dir) = &cli.log_dir else {
        return Ok(());
    };
    let cwd = std::env::current_dir().map_err(|err| format!("cannot resolve cwd: {err}"))?;
    let dir = absolute_log_dir(dir, &cwd);
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, &dir.to_string_lossy()).map_err(|err| err.to_string())
}
