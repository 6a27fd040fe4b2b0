// src/process/output.rs

//! Merged output: a process's output stream followed by its exit status.

use std::pin::Pin;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use crate::errors::{Error, ProcessError, Result};

use super::description::ProcessDescribing;
use super::launch::{Capture, Launch, RunningProcess};

type OutputReader = BufReader<Pin<Box<dyn AsyncRead + Send>>>;

/// Lazily produced output of a running process, terminated by its exit
/// status.
///
/// Every chunk or line the process writes is yielded in order. After the
/// stream reaches end-of-file, the exit status is checked exactly once:
/// - `0` ends the stream (`Ok(None)`),
/// - anything else yields `Err(Error::Exit(ProcessError { status }))`.
///
/// After that terminal event every further call returns `Ok(None)`.
///
/// The exit watcher runs concurrently with reading, so a process producing
/// more output than fits in a pipe buffer never blocks on a reader that is
/// waiting for it to exit.
pub struct OutputStream {
    reader: OutputReader,
    process: RunningProcess,
    finished: bool,
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStream")
            .field("process", &self.process)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl OutputStream {
    fn new(reader: Pin<Box<dyn AsyncRead + Send>>, process: RunningProcess) -> Self {
        Self {
            reader: BufReader::new(reader),
            process,
            finished: false,
        }
    }

    /// OS process id of the producing process.
    pub fn id(&self) -> Option<u32> {
        self.process.id()
    }

    /// Next chunk of raw bytes, as soon as any are available.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }

        let chunk = self.reader.fill_buf().await?.to_vec();
        if chunk.is_empty() {
            return self.finish().await.map(|()| None);
        }

        self.reader.consume(chunk.len());
        Ok(Some(chunk))
    }

    /// Next line, without its trailing `\n` (or `\r\n`).
    ///
    /// A final line without a newline is still yielded. Invalid UTF-8 fails
    /// with an I/O error of kind `InvalidData`.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return self.finish().await.map(|()| None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Drain the whole stream into memory.
    pub async fn read_to_end(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    /// Drain the whole stream and decode it as UTF-8.
    pub async fn read_to_string(self) -> Result<String> {
        let data = self.read_to_end().await?;
        Ok(String::from_utf8(data)?)
    }

    async fn finish(&mut self) -> Result<()> {
        self.finished = true;
        debug!(pid = self.process.id(), "output stream closed; checking exit status");

        match self.process.wait().await? {
            0 => Ok(()),
            status => Err(Error::from(ProcessError { status })),
        }
    }
}

impl<D: ProcessDescribing> Launch<D> {
    /// Launch with stdout captured as an [`OutputStream`].
    ///
    /// A stdout endpoint set on this `Launch` is replaced by the capture.
    pub fn output(self) -> Result<OutputStream> {
        let mut process = self.spawn_capturing(Capture::Stdout)?;
        let stdout = process
            .take_stdout()
            .ok_or_else(|| Error::Other(anyhow::anyhow!("captured stdout is missing")))?;
        Ok(OutputStream::new(Box::pin(stdout), process))
    }

    /// Launch with stderr captured as an [`OutputStream`].
    pub fn error_output(self) -> Result<OutputStream> {
        let mut process = self.spawn_capturing(Capture::Stderr)?;
        let stderr = process
            .take_stderr()
            .ok_or_else(|| Error::Other(anyhow::anyhow!("captured stderr is missing")))?;
        Ok(OutputStream::new(Box::pin(stderr), process))
    }

    /// Launch and collect all of stdout; fails on a nonzero exit.
    pub async fn read_bytes(self) -> Result<Vec<u8>> {
        self.output()?.read_to_end().await
    }

    /// Launch and collect all of stdout as UTF-8; fails on a nonzero exit.
    pub async fn read_string(self) -> Result<String> {
        self.output()?.read_to_string().await
    }
}
