//! CLI module for FitBuddy
//!
//! Provides command-line parsing for the fitbuddy-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// FitBuddy - retrieval-augmented fitness assistant
#[derive(Parser, Debug)]
#[command(
    name = "fitbuddy-server",
    version,
    about = "FitBuddy - retrieval-augmented fitness assistant",
    long_about = "Indexes a fitness document and answers questions about it over HTTP,\n\
                  using a Gemini agent that searches the document before replying.\n\n\
                  Run without arguments to ingest the source document and start the server.",
    after_help = "EXAMPLES:\n    \
                  fitbuddy-server                       # Ingest, then serve on 127.0.0.1:8000\n    \
                  fitbuddy-server ingest                # Only (re)build the index\n    \
                  fitbuddy-server config                # Show the resolved configuration\n    \
                  fitbuddy-server --config prod.toml    # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "fitbuddy.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "FITBUDDY_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// How log lines are written to stdout
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Ingest the source document, then serve `POST /chat`
    Serve,

    /// Ingest the source document and exit
    Ingest,

    /// Show the resolved configuration
    Config,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, `serve` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
