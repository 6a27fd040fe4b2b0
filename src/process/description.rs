// src/process/description.rs

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::errors::Result;

use super::launch::Launch;

/// Anything that can describe an external program to launch.
///
/// Implemented by [`ProcessDescription`] and
/// [`ShellCommand`](crate::shell::ShellCommand).
pub trait ProcessDescribing {
    /// Path of the executable. Failing here aborts the launch before any
    /// endpoint is touched.
    fn launch_path(&self) -> Result<PathBuf>;

    fn arguments(&self) -> Vec<String>;

    /// Full replacement environment; `None` inherits the caller's.
    fn environment(&self) -> Option<HashMap<String, String>> {
        None
    }

    /// Start building a launch of this description.
    fn launch(self) -> Launch<Self>
    where
        Self: Sized,
    {
        Launch::new(self)
    }
}

/// Plain program + arguments + optional environment.
///
/// Immutable once handed to [`ProcessDescribing::launch`]; the builder methods
/// consume `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescription {
    program: PathBuf,
    args: Vec<String>,
    env: Option<HashMap<String, String>>,
}

impl ProcessDescription {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replace the inherited environment entirely with `env`.
    pub fn environment<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            env.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn program(&self) -> &OsStr {
        self.program.as_os_str()
    }
}

impl ProcessDescribing for ProcessDescription {
    fn launch_path(&self) -> Result<PathBuf> {
        Ok(self.program.clone())
    }

    fn arguments(&self) -> Vec<String> {
        self.args.clone()
    }

    fn environment(&self) -> Option<HashMap<String, String>> {
        self.env.clone()
    }
}

impl<D: ProcessDescribing + ?Sized> ProcessDescribing for &D {
    fn launch_path(&self) -> Result<PathBuf> {
        (**self).launch_path()
    }

    fn arguments(&self) -> Vec<String> {
        (**self).arguments()
    }

    fn environment(&self) -> Option<HashMap<String, String>> {
        (**self).environment()
    }
}
