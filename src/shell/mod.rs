// src/shell/mod.rs

//! Shell selection and shell-string commands.
//!
//! A [`ShellCommand`] is an opaque command string handed to `<shell> -c`;
//! nothing here parses shell grammar.

pub mod command;
pub mod path;

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use crate::errors::{Error, Result};

pub use command::ShellCommand;
pub use path::{find_executable, find_executable_in};

/// A shell, identified by name (looked up on `PATH`) or by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shell {
    name: Cow<'static, str>,
}

impl Shell {
    pub const BASH: Shell = Shell::from_static("bash");
    pub const ZSH: Shell = Shell::from_static("zsh");
    pub const SH: Shell = Shell::from_static("sh");

    const fn from_static(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
        }
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Preferred shell available on `PATH`: zsh, then bash, then sh.
    pub fn detect() -> Self {
        [Shell::ZSH, Shell::BASH]
            .into_iter()
            .find(|shell| find_executable(shell.name()).is_some())
            .unwrap_or(Shell::SH)
    }

    /// Absolute path of this shell's executable.
    ///
    /// Names containing a `/` are used as-is; bare names are searched on
    /// `PATH`.
    pub fn executable(&self) -> Result<PathBuf> {
        if self.name.contains('/') {
            return Ok(PathBuf::from(self.name.as_ref()));
        }
        find_executable(&self.name).ok_or_else(|| Error::ExecutableNotFound(self.name.to_string()))
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::detect()
    }
}

impl From<&str> for Shell {
    fn from(name: &str) -> Self {
        Shell::new(name)
    }
}

impl From<String> for Shell {
    fn from(name: String) -> Self {
        Shell::new(name)
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
