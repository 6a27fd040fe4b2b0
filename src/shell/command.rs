// src/shell/command.rs

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use crate::errors::Result;
use crate::process::ProcessDescribing;

use super::Shell;

/// A command string run as `<shell> -c <raw>`.
///
/// The helpers below only build the string; quoting wraps the text and
/// escapes embedded quotes, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    shell: Shell,
    raw: String,
    env: BTreeMap<String, String>,
}

impl ShellCommand {
    /// Command for the detected default shell.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            shell: Shell::default(),
            raw: raw.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_shell(mut self, shell: impl Into<Shell>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Set an environment variable on top of the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn remove_env(&mut self, key: &str) -> Option<String> {
        self.env.remove(key)
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Append text verbatim.
    pub fn push_raw(&mut self, text: &str) -> &mut Self {
        self.raw.push_str(text);
        self
    }

    /// Append another command's text verbatim.
    pub fn push_command(&mut self, other: &ShellCommand) -> &mut Self {
        self.push_raw(&other.raw)
    }

    /// Append `text` in single quotes; embedded `'` become `'\''`.
    pub fn push_quoted(&mut self, text: &str) -> &mut Self {
        self.raw.push('\'');
        self.raw.push_str(&text.replace('\'', r"'\''"));
        self.raw.push('\'');
        self
    }

    /// Append `text` in double quotes; embedded `"`, `\`, `$` and `` ` `` are
    /// backslash-escaped.
    pub fn push_double_quoted(&mut self, text: &str) -> &mut Self {
        self.raw.push('"');
        for c in text.chars() {
            if matches!(c, '"' | '\\' | '$' | '`') {
                self.raw.push('\\');
            }
            self.raw.push(c);
        }
        self.raw.push('"');
        self
    }

    /// Append a value's `Display` form, single-quoted.
    pub fn push_display(&mut self, value: impl fmt::Display) -> &mut Self {
        self.push_quoted(&value.to_string())
    }
}

impl From<&str> for ShellCommand {
    fn from(raw: &str) -> Self {
        ShellCommand::new(raw)
    }
}

impl From<String> for ShellCommand {
    fn from(raw: String) -> Self {
        ShellCommand::new(raw)
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl ProcessDescribing for ShellCommand {
    fn launch_path(&self) -> Result<PathBuf> {
        self.shell.executable()
    }

    fn arguments(&self) -> Vec<String> {
        vec!["-c".to_string(), self.raw.clone()]
    }

    /// `None` without overrides; otherwise the caller's environment (entries
    /// that are valid UTF-8) with the overrides applied.
    fn environment(&self) -> Option<HashMap<String, String>> {
        if self.env.is_empty() {
            return None;
        }

        let mut env: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        Some(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_quoted_command_text() {
        let mut cmd = ShellCommand::new("printf %s ").with_shell(Shell::SH);
        cmd.push_quoted("it's").push_raw(" ").push_double_quoted("$HOME \"x\"");
        assert_eq!(cmd.raw(), r#"printf %s 'it'\''s' "\$HOME \"x\"""#);
    }

    #[test]
    fn push_display_quotes_values() {
        let mut cmd = ShellCommand::new("sleep ");
        cmd.push_display(0.5);
        assert_eq!(cmd.to_string(), "sleep '0.5'");
    }

    #[test]
    fn arguments_hand_raw_string_to_shell() {
        let cmd = ShellCommand::from("echo hi | wc -c");
        assert_eq!(cmd.arguments(), vec!["-c".to_string(), "echo hi | wc -c".to_string()]);
    }

    #[test]
    fn environment_is_inherited_unless_overridden() {
        let cmd = ShellCommand::new("true");
        assert!(cmd.environment().is_none());

        let cmd = cmd.env("ASYNC_SHELL_TEST_VALUE", "42");
        assert_eq!(cmd.get_env("ASYNC_SHELL_TEST_VALUE"), Some("42"));
        let env = cmd.environment().unwrap();
        assert_eq!(env.get("ASYNC_SHELL_TEST_VALUE").map(String::as_str), Some("42"));
        if let Ok(path) = std::env::var("PATH") {
            assert_eq!(env.get("PATH"), Some(&path));
        }
    }
}
