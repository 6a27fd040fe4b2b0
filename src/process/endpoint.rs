// src/process/endpoint.rs

//! Stream attachment points for a process's stdin/stdout/stderr.
//!
//! An [`Endpoint`] is resolved into a concrete [`Stdio`] right before the
//! process is spawned. Resolution failures (missing file, pipe end used in the
//! wrong direction) surface before anything starts.

use std::fs::{File, OpenOptions};
use std::io::{self, PipeReader, PipeWriter};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use crate::errors::{Error, Result};

/// Logical source or sink for one of a process's standard streams.
///
/// Endpoints are moved into the process on resolution; whatever created the
/// underlying resource (a file opened by the caller, one end of a [`Pipe`])
/// hands ownership of that end to the child.
#[derive(Debug)]
pub enum Endpoint {
    /// Use the parent's stream.
    Inherit,
    /// `/dev/null` (empty input, discarded output).
    Null,
    /// A path opened on resolution: read-only as input, created and truncated
    /// as output.
    Path(PathBuf),
    /// An already-open file handle.
    File(File),
    /// Read end of an in-process pipe.
    PipeReader(PipeReader),
    /// Write end of an in-process pipe.
    PipeWriter(PipeWriter),
}

impl Endpoint {
    /// Resolve this endpoint as a process input (stdin).
    pub fn resolve_readable(self) -> Result<Stdio> {
        debug!(endpoint = ?self, "resolving readable endpoint");
        match self {
            Endpoint::Inherit => Ok(Stdio::inherit()),
            Endpoint::Null => Ok(Stdio::null()),
            Endpoint::Path(path) => File::open(&path)
                .map(Stdio::from)
                .map_err(|source| resolve_error(&path, source)),
            Endpoint::File(file) => Ok(Stdio::from(file)),
            Endpoint::PipeReader(reader) => Ok(Stdio::from(reader)),
            Endpoint::PipeWriter(_) => Err(Error::Resolve {
                endpoint: "pipe write end".to_string(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "cannot read from the write end of a pipe",
                ),
            }),
        }
    }

    /// Resolve this endpoint as a process output (stdout/stderr).
    pub fn resolve_writable(self) -> Result<Stdio> {
        debug!(endpoint = ?self, "resolving writable endpoint");
        match self {
            Endpoint::Inherit => Ok(Stdio::inherit()),
            Endpoint::Null => Ok(Stdio::null()),
            Endpoint::Path(path) => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .map(Stdio::from)
                .map_err(|source| resolve_error(&path, source)),
            Endpoint::File(file) => Ok(Stdio::from(file)),
            Endpoint::PipeWriter(writer) => Ok(Stdio::from(writer)),
            Endpoint::PipeReader(_) => Err(Error::Resolve {
                endpoint: "pipe read end".to_string(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "cannot write to the read end of a pipe",
                ),
            }),
        }
    }
}

fn resolve_error(path: &Path, source: io::Error) -> Error {
    Error::Resolve {
        endpoint: format!("file {}", path.display()),
        source,
    }
}

impl From<PathBuf> for Endpoint {
    fn from(path: PathBuf) -> Self {
        Endpoint::Path(path)
    }
}

impl From<&Path> for Endpoint {
    fn from(path: &Path) -> Self {
        Endpoint::Path(path.to_path_buf())
    }
}

impl From<File> for Endpoint {
    fn from(file: File) -> Self {
        Endpoint::File(file)
    }
}

impl From<PipeReader> for Endpoint {
    fn from(reader: PipeReader) -> Self {
        Endpoint::PipeReader(reader)
    }
}

impl From<PipeWriter> for Endpoint {
    fn from(writer: PipeWriter) -> Self {
        Endpoint::PipeWriter(writer)
    }
}

/// An anonymous OS pipe with both ends still held by this process.
#[derive(Debug)]
pub struct Pipe {
    reader: PipeReader,
    writer: PipeWriter,
}

impl Pipe {
    pub fn new() -> Result<Self> {
        let (reader, writer) = io::pipe().map_err(|source| Error::Resolve {
            endpoint: "pipe".to_string(),
            source,
        })?;
        Ok(Self { reader, writer })
    }

    /// Split into `(read end, write end)`.
    ///
    /// Each end should be attached to exactly one process; once both
    /// processes are spawned the parent holds neither, so the reader sees
    /// end-of-stream when the writer exits.
    pub fn into_parts(self) -> (PipeReader, PipeWriter) {
        (self.reader, self.writer)
    }
}
