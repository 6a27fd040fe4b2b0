// src/errors.rs

//! Crate-wide error types.
//!
//! Library operations return [`Result`] with the structured [`Error`] below.
//! [`ProcessError`] and [`DuplicateKeyError`] are standalone so callers using
//! their own error types (or `anyhow`) can still match on them.

use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// A process terminated with a nonzero exit status.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("process exited with status {status}")]
pub struct ProcessError {
    pub status: i32,
}

/// Two scheduled elements produced the same key while duplicates were
/// rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("duplicate key in mapping: {key}")]
pub struct DuplicateKeyError {
    /// `Debug` rendering of the colliding key.
    pub key: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for process: {0}")]
    Wait(#[source] io::Error),

    #[error(transparent)]
    Exit(#[from] ProcessError),

    #[error("executable not found on PATH: {0}")]
    ExecutableNotFound(String),

    #[error("process output is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    #[error(transparent)]
    DuplicateKey(#[from] DuplicateKeyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Exit status carried by this error, if it is a process exit failure.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Error::Exit(e) => Some(e.status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
