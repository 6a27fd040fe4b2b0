// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::mapreduce::Window;

/// Command-line arguments for `async-shell`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "async-shell",
    version,
    about = "Run shell commands concurrently with a bounded number of jobs.",
    long_about = None
)]
pub struct CliArgs {
    /// Commands to run instead of the tasks of the batch file.
    ///
    /// Each one becomes a task named after its position (`#1`, `#2`, ...).
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// Path to the batch file (TOML).
    ///
    /// Default: `AsyncShell.toml` when no COMMAND is given.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Maximum number of commands running at once.
    ///
    /// Overrides `[config].jobs`; defaults to the available parallelism.
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<Window>,

    /// Shell used to run every command (name on PATH or absolute path).
    #[arg(long, value_name = "SHELL")]
    pub shell: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASYNC_SHELL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved batch, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
