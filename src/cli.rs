//! Command-line interface definitions for Stack Pulse.
//!
//! All options can also come from environment variables, so the binary works
//! unchanged under a process supervisor.

use clap::{Parser, Subcommand};

/// Default dashboard bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default location of the question database file.
pub const DEFAULT_DB_PATH: &str = "data/stack_questions.db";

/// Command-line arguments for the Stack Pulse application.
///
/// # Examples
///
/// ```sh
/// # Serve the dashboard (default command)
/// stack_pulse serve --bind 0.0.0.0:8080
///
/// # Scrape one keyword into the store from the terminal
/// stack_pulse scrape "borrow checker"
///
/// # Wipe all stored history
/// stack_pulse reset
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the SQLite question database
    #[arg(long, env = "STACK_PULSE_DB", default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the dashboard web server
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "STACK_PULSE_BIND", default_value = DEFAULT_BIND)]
        bind: String,
    },
    /// Fetch one keyword's questions and append them to the store
    Scrape {
        /// Keyword to search question titles for
        keyword: String,
    },
    /// Delete the question database
    Reset,
}
