#![allow(dead_code)]

pub use async_shell_test_utils::{init_tracing, with_timeout};

use async_shell::shell::{Shell, ShellCommand};

/// A command run by plain `sh`, so tests don't depend on which shells are
/// installed.
pub fn sh(raw: &str) -> ShellCommand {
    ShellCommand::new(raw).with_shell(Shell::SH)
}
