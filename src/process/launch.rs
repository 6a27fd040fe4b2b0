// src/process/launch.rs

//! Launching a described process and waiting on it.

use std::future::Future;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::errors::{Error, ProcessError, Result};

use super::description::ProcessDescribing;
use super::endpoint::Endpoint;

/// Which output stream, if any, the engine captures for itself instead of
/// attaching a caller-provided endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Capture {
    None,
    Stdout,
    Stderr,
}

/// A process description plus the endpoints to attach to its streams.
///
/// Unset streams are inherited from the caller. Nothing happens until one of
/// the launching methods ([`spawn`](Self::spawn), [`status`](Self::status),
/// [`and_perform`](Self::and_perform), [`output`](Self::output), ...) is
/// called; each of them consumes the `Launch`, so a description is launched
/// at most once per `Launch`.
#[derive(Debug)]
pub struct Launch<D> {
    description: D,
    stdin: Option<Endpoint>,
    stdout: Option<Endpoint>,
    stderr: Option<Endpoint>,
}

impl<D: ProcessDescribing> Launch<D> {
    pub fn new(description: D) -> Self {
        Self {
            description,
            stdin: None,
            stdout: None,
            stderr: None,
        }
    }

    pub fn stdin(mut self, endpoint: impl Into<Endpoint>) -> Self {
        self.stdin = Some(endpoint.into());
        self
    }

    pub fn stdout(mut self, endpoint: impl Into<Endpoint>) -> Self {
        self.stdout = Some(endpoint.into());
        self
    }

    pub fn stderr(mut self, endpoint: impl Into<Endpoint>) -> Self {
        self.stderr = Some(endpoint.into());
        self
    }

    /// Resolve endpoints, start the process and arm its exit signal.
    pub fn spawn(self) -> Result<RunningProcess> {
        self.spawn_capturing(Capture::None)
    }

    pub(crate) fn spawn_capturing(self, capture: Capture) -> Result<RunningProcess> {
        let Launch {
            description,
            stdin,
            stdout,
            stderr,
        } = self;

        let program = description.launch_path()?;

        let stdin = stdin.map(Endpoint::resolve_readable).transpose()?;
        let stdout = attach_output(stdout, capture == Capture::Stdout, "stdout")?;
        let stderr = attach_output(stderr, capture == Capture::Stderr, "stderr")?;

        let mut cmd = Command::new(&program);
        cmd.args(description.arguments()).kill_on_drop(false);

        if let Some(env) = description.environment() {
            cmd.env_clear().envs(env);
        }
        if let Some(stdin) = stdin {
            cmd.stdin(stdin);
        }
        if let Some(stdout) = stdout {
            cmd.stdout(stdout);
        }
        if let Some(stderr) = stderr {
            cmd.stderr(stderr);
        }

        // The exit signal exists before the child does, so an immediate exit
        // can't be missed.
        let (exit_tx, exit_rx) = oneshot::channel();

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            program: program.display().to_string(),
            source,
        })?;
        // Drop our copies of the attached handles (pipe ends in particular)
        // so readers downstream see end-of-stream when the child exits.
        drop(cmd);

        let pid = child.id();
        let program_name = display_name(&program);
        info!(program = %program_name, pid, "process started");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        tokio::spawn(async move {
            let outcome = child.wait().await.map(exit_code);
            match &outcome {
                Ok(code) => info!(
                    program = %program_name,
                    pid,
                    exit_code = *code,
                    success = *code == 0,
                    "process exited"
                ),
                Err(e) => warn!(
                    program = %program_name,
                    pid,
                    error = %e,
                    "failed to wait for process"
                ),
            }
            // The receiver may already be gone; the process has still been
            // reaped.
            let _ = exit_tx.send(outcome);
        });

        Ok(RunningProcess {
            pid,
            exit: exit_rx,
            outcome: None,
            stdout,
            stderr,
        })
    }

    /// Launch and wait for the exit code.
    ///
    /// A nonzero exit is returned as data, not as an error; only resolution,
    /// spawn and wait failures are errors here.
    pub async fn status(self) -> Result<i32> {
        self.spawn()?.wait().await
    }

    /// Launch the process and run `sidework` concurrently with it.
    ///
    /// The exit status is checked first: a nonzero status fails with
    /// [`Error::Exit`] and `sidework`'s result is never surfaced. Sidework
    /// still running at that point is awaited to completion before the
    /// failure is returned; it is never cancelled. On a zero status,
    /// `sidework`'s own result is returned.
    ///
    /// `sidework` typically drains a pipe attached to this process's output,
    /// which is why the two must make progress together.
    pub async fn and_perform<F, T, E>(self, sidework: F) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: From<Error>,
    {
        let mut process = self.spawn()?;
        tokio::pin!(sidework);

        let mut finished = None;
        let status = loop {
            tokio::select! {
                status = process.wait() => break status?,
                result = &mut sidework, if finished.is_none() => finished = Some(result),
            }
        };

        if status != 0 {
            debug!(
                pid = process.id(),
                status,
                sidework_finished = finished.is_some(),
                "process failed; discarding sidework result"
            );
            if finished.is_none() {
                let _ = sidework.await;
            }
            return Err(Error::from(ProcessError { status }).into());
        }

        match finished {
            Some(result) => result,
            None => sidework.await,
        }
    }
}

fn attach_output(
    endpoint: Option<Endpoint>,
    captured: bool,
    stream: &'static str,
) -> Result<Option<Stdio>> {
    if captured {
        if let Some(endpoint) = endpoint {
            warn!(stream, ?endpoint, "endpoint replaced by output capture");
        }
        return Ok(Some(Stdio::piped()));
    }
    endpoint.map(Endpoint::resolve_writable).transpose()
}

fn display_name(program: &Path) -> String {
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Integer exit code for `status`.
///
/// On Unix a process killed by signal `N` reports `128 + N`, as shells do;
/// `-1` is used when no code is available at all.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Copyable record of a failed wait, so the same error can be handed out on
/// every later call.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WaitFailure {
    kind: io::ErrorKind,
    message: String,
}

impl WaitFailure {
    fn watcher_stopped() -> Self {
        Self {
            kind: io::ErrorKind::Other,
            message: "exit watcher stopped before the process exited".to_string(),
        }
    }

    fn to_io_error(&self) -> io::Error {
        io::Error::new(self.kind, self.message.clone())
    }
}

impl From<io::Error> for WaitFailure {
    fn from(e: io::Error) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// A live (or finished) OS process started by [`Launch::spawn`].
///
/// Dropping the handle never kills the process: it keeps running and is
/// reaped in the background.
#[derive(Debug)]
pub struct RunningProcess {
    pid: Option<u32>,
    exit: oneshot::Receiver<io::Result<i32>>,
    /// Terminal outcome once the exit signal has been received; the receiver
    /// must not be polled again after that.
    outcome: Option<std::result::Result<i32, WaitFailure>>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl RunningProcess {
    /// OS process id, if the process had not already been reaped at spawn.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Wait until the process exits and return its exit code.
    ///
    /// Cancel-safe; once the outcome is known every later call returns it
    /// again immediately, including a failure to wait.
    pub async fn wait(&mut self) -> Result<i32> {
        if self.outcome.is_none() {
            let received = (&mut self.exit).await;
            self.record(received.ok());
        }
        self.cached_outcome()
    }

    /// Exit code if the process is already known to have exited.
    pub fn try_status(&mut self) -> Option<i32> {
        if self.outcome.is_none() {
            match self.exit.try_recv() {
                Ok(outcome) => self.record(Some(outcome)),
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => self.record(None),
            }
        }
        match self.outcome {
            Some(Ok(code)) => Some(code),
            _ => None,
        }
    }

    /// `None` means the reaper went away without reporting.
    fn record(&mut self, received: Option<io::Result<i32>>) {
        let outcome = match received {
            Some(Ok(code)) => Ok(code),
            Some(Err(e)) => Err(WaitFailure::from(e)),
            None => Err(WaitFailure::watcher_stopped()),
        };
        if let Err(failure) = &outcome {
            warn!(pid = self.pid, error = %failure.message, "waiting for process failed");
        }
        self.outcome = Some(outcome);
    }

    fn cached_outcome(&self) -> Result<i32> {
        match &self.outcome {
            Some(Ok(code)) => Ok(*code),
            Some(Err(failure)) => Err(Error::Wait(failure.to_io_error())),
            None => Err(Error::Wait(WaitFailure::watcher_stopped().to_io_error())),
        }
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub(crate) fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }
}
