// src/process/mod.rs

//! Process execution engine.
//!
//! Launches external programs with `tokio::process::Command`, attaching
//! caller-chosen endpoints to their standard streams.
//!
//! - [`description`] defines what to run ([`ProcessDescribing`],
//!   [`ProcessDescription`]).
//! - [`endpoint`] resolves files, pipes and inherited handles into `Stdio`.
//! - [`launch`] owns the [`Launch`] builder, the plain exit-status launch and
//!   the joint launch with concurrent sidework.
//! - [`output`] exposes a process's output merged with its exit status as an
//!   [`OutputStream`].
//! - [`pipeline`] chains one launch's stdout into another's stdin.
//!
//! A started process is never killed by this module; dropping any handle only
//! stops *waiting* for it.

pub mod description;
pub mod endpoint;
pub mod launch;
pub mod output;
pub mod pipeline;

pub use description::{ProcessDescribing, ProcessDescription};
pub use endpoint::{Endpoint, Pipe};
pub use launch::{Launch, RunningProcess};
pub use output::OutputStream;
