// src/lib.rs

//! Bounded-concurrency map/reduce and asynchronous process execution on
//! Tokio.
//!
//! - [`mapreduce`]: run an async transform over a sequence with at most `W`
//!   transforms in flight, folding results in completion order.
//! - [`process`]: launch external programs with files, pipes or inherited
//!   handles attached, and await their exit status, their merged output, or
//!   both alongside concurrent side work.
//! - [`shell`]: shell-string commands on top of [`process`].
//!
//! The remaining modules back the `async-shell` binary.

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod mapreduce;
pub mod process;
pub mod shell;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, BatchTask, ConfigFile};
use crate::mapreduce::{Duplicates, Scheduler, Window};
use crate::process::ProcessDescribing;
use crate::shell::{Shell, ShellCommand};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - batch loading (config file and/or ad-hoc commands)
/// - CLI overrides for jobs and shell
/// - the scheduler running every task's command
/// - printing captured output in task order
pub async fn run(args: CliArgs) -> Result<()> {
    let (window, tasks) = resolve_batch(&args)?;

    if args.dry_run {
        print_dry_run(window, &tasks);
        return Ok(());
    }

    let order: Vec<String> = tasks.iter().map(|t| t.name.clone()).collect();
    info!(window = window.get(), tasks = tasks.len(), "running batch");

    let mut outputs = Scheduler::new(window)
        .try_map_to_map(tasks, Duplicates::Reject, |task| async move {
            let output = run_task(&task)
                .await
                .with_context(|| format!("task '{}' failed", task.name))?;
            Ok::<_, anyhow::Error>((task.name, output))
        })
        .await?;

    for name in order {
        if let Some(output) = outputs.remove(&name) {
            println!("== {name} ==");
            print!("{output}");
        }
    }

    debug!("batch complete");
    Ok(())
}

/// Run one task's command and capture its stdout.
async fn run_task(task: &BatchTask) -> errors::Result<String> {
    let mut launch = task.command.clone().launch();
    if let Some(stdin) = &task.stdin {
        launch = launch.stdin(stdin.clone());
    }
    launch.read_string().await
}

/// Work out the window and task list from the CLI and the batch file.
///
/// - Positional commands replace the batch file's tasks; the batch file is
///   then only read when `--config` is given explicitly.
/// - Without positional commands the batch file (default `AsyncShell.toml`)
///   is required.
/// - `--jobs` / `--shell` win over `[config]`.
fn resolve_batch(args: &CliArgs) -> Result<(Window, Vec<BatchTask>)> {
    let cfg: Option<ConfigFile> = match (&args.config, args.commands.is_empty()) {
        (Some(path), _) => Some(
            load_and_validate(path).with_context(|| format!("loading batch file {path}"))?,
        ),
        (None, true) => {
            let path = default_config_path();
            Some(
                load_and_validate(&path)
                    .with_context(|| format!("loading batch file {}", path.display()))?,
            )
        }
        (None, false) => None,
    };

    let window = args
        .jobs
        .or_else(|| cfg.as_ref().map(ConfigFile::window))
        .unwrap_or_default();

    let shell = match (&args.shell, &cfg) {
        (Some(name), _) => Shell::from(name.as_str()),
        (None, Some(cfg)) => cfg.shell(),
        (None, None) => Shell::default(),
    };

    let tasks = if args.commands.is_empty() {
        cfg.as_ref()
            .map(ConfigFile::tasks)
            .unwrap_or_default()
            .into_iter()
            .map(|task| BatchTask {
                command: task.command.with_shell(shell.clone()),
                ..task
            })
            .collect()
    } else {
        args.commands
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let command = cfg
                    .iter()
                    .flat_map(|cfg| cfg.env.iter())
                    .fold(
                        ShellCommand::new(raw.clone()).with_shell(shell.clone()),
                        |cmd, (k, v)| cmd.env(k.clone(), v.clone()),
                    );
                BatchTask {
                    name: format!("#{}", i + 1),
                    command,
                    stdin: None,
                }
            })
            .collect()
    };

    Ok((window, tasks))
}

/// Simple dry-run output: print window, shell and commands.
fn print_dry_run(window: Window, tasks: &[BatchTask]) {
    println!("async-shell dry-run");
    println!("  jobs = {window}");
    println!();

    println!("tasks ({}):", tasks.len());
    for task in tasks {
        println!("  - {}", task.name);
        println!("      shell: {}", task.command.shell());
        println!("      cmd: {}", task.command);
        if let Some(ref stdin) = task.stdin {
            println!("      stdin: {}", stdin.display());
        }
    }

    debug!("dry-run complete (no execution)");
}
