//! Command-line surface and runtime configuration.
//!
//! # Responsibility
//! - Declare flags and subcommands.
//! - Resolve database and log locations from flags, environment and defaults.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "SHOPLIST_DB_PATH";
const DEFAULT_DB_FILE_NAME: &str = "shoplist.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "shoplist", version, about = "Keep a shopping list in a local SQLite file")]
pub struct Cli {
    /// Database file; falls back to $SHOPLIST_DB_PATH, then the temp dir.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Directory for rotating log files; logging is off when omitted.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print the list as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One-shot actions. Positions are 1-based, as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the list.
    List,
    /// Add an item.
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Flip the bought flag of the item at POSITION.
    Toggle { position: usize },
    /// Rename the item at POSITION.
    Edit {
        position: usize,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete the item at POSITION.
    Delete { position: usize },
    /// Interactive shell (default).
    Shell,
}

/// Picks the database path: flag, then environment, then temp dir.
pub fn resolve_db_path(flag: Option<PathBuf>, env_value: Option<String>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(raw) = env_value {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

/// Makes `dir` absolute relative to `cwd`; the logger only accepts absolute paths.
pub fn absolute_log_dir(dir: &Path, cwd: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}
