// src/process/pipeline.rs

//! Chaining one process's stdout into another process's stdin.

use std::future::Future;

use crate::errors::{Error, Result};

use super::description::ProcessDescribing;
use super::endpoint::Pipe;
use super::launch::Launch;

impl<D: ProcessDescribing> Launch<D> {
    /// Pipe this process's stdout into `next`'s stdin.
    ///
    /// `consume` receives `next` with the pipe's read end attached and
    /// decides how to run it (typically [`Launch::read_string`] or
    /// [`Launch::output`]). This process is the "process" half of a joint
    /// launch and `consume` is the sidework, so both run concurrently and
    /// neither side can stall on a full pipe buffer.
    ///
    /// Fails with [`Error::Exit`] if this process exits nonzero, whatever the
    /// downstream outcome; otherwise returns `consume`'s result.
    pub async fn pipe_to<D2, F, Fut, T, E>(
        self,
        next: Launch<D2>,
        consume: F,
    ) -> std::result::Result<T, E>
    where
        D2: ProcessDescribing,
        F: FnOnce(Launch<D2>) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<Error>,
    {
        let (reader, writer) = Pipe::new()?.into_parts();
        let upstream = self.stdout(writer);
        let downstream = next.stdin(reader);

        upstream.and_perform(consume(downstream)).await
    }

    /// `self | next`, collecting `next`'s stdout as UTF-8.
    pub async fn pipe_to_string<D2>(self, next: Launch<D2>) -> Result<String>
    where
        D2: ProcessDescribing,
    {
        self.pipe_to(next, Launch::read_string).await
    }
}
