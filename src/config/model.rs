// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::mapreduce::Window;
use crate::shell::{Shell, ShellCommand};

/// Batch file exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [config]
/// jobs = 4
/// shell = "bash"
///
/// [env]
/// RUST_LOG = "info"
///
/// [task.build]
/// cmd = "cargo build"
///
/// [task.lint]
/// cmd = "cargo clippy"
/// env = { CLIPPY_CONF_DIR = "." }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Environment overrides applied to every task.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Tasks keyed by name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A validated batch file. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub env: BTreeMap<String, String>,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        env: BTreeMap<String, String>,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self { config, env, task }
    }

    /// Scheduling window: `[config].jobs`, or available parallelism.
    pub fn window(&self) -> Window {
        self.config
            .jobs
            .and_then(Window::new)
            .unwrap_or_default()
    }

    /// Shell for every task: `[config].shell`, or the detected default.
    pub fn shell(&self) -> Shell {
        self.config
            .shell
            .as_deref()
            .map(Shell::from)
            .unwrap_or_default()
    }

    /// Turn every task into a runnable [`BatchTask`], in name order.
    pub fn tasks(&self) -> Vec<BatchTask> {
        let shell = self.shell();
        self.task
            .iter()
            .map(|(name, task)| {
                let command = self
                    .env
                    .iter()
                    .chain(task.env.iter())
                    .fold(
                        ShellCommand::new(task.cmd.clone()).with_shell(shell.clone()),
                        |cmd, (k, v)| cmd.env(k.clone(), v.clone()),
                    );
                BatchTask {
                    name: name.clone(),
                    command,
                    stdin: task.stdin.clone(),
                }
            })
            .collect()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Maximum number of tasks running at once. Absent means available
    /// parallelism.
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Shell name or path. Absent means zsh, bash or sh, whichever is found
    /// first.
    #[serde(default)]
    pub shell: Option<String>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Command string handed to the shell.
    pub cmd: String,

    /// Per-task environment overrides; they win over `[env]`.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// File fed to the command's stdin.
    #[serde(default)]
    pub stdin: Option<PathBuf>,
}

/// One runnable entry of a batch.
#[derive(Debug, Clone)]
pub struct BatchTask {
    pub name: String,
    pub command: ShellCommand,
    pub stdin: Option<PathBuf>,
}
