// src/logging.rs

//! Logging setup for `async-shell` using `tracing` + `tracing-subscriber`.
//!
//! The active filter is chosen in this order:
//! 1. `--log-level` CLI flag, applied to every target
//! 2. `ASYNC_SHELL_LOG`, read as `EnvFilter` directives
//!    (e.g. `info`, `async_shell::process=debug,warn`)
//! 3. `info`
//!
//! Invalid `ASYNC_SHELL_LOG` directives are reported on stderr and ignored.
//! Logs go to STDERR so that stdout carries only command output.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives when no `--log-level` is
/// given.
pub const LOG_ENV_VAR: &str = "ASYNC_SHELL_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_directives = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env_directives.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

/// Filter for the given flag and environment value.
fn build_filter(cli_level: Option<LogLevel>, env_directives: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level_directive(level));
    }

    match env_directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("async-shell: ignoring invalid {LOG_ENV_VAR} ({e})");
            EnvFilter::new(DEFAULT_DIRECTIVES)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    }
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
