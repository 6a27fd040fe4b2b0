// tests/process_launch.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, sh, with_timeout};

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_shell::errors::{Error, ProcessError};
use async_shell::process::{Endpoint, Pipe, ProcessDescribing, ProcessDescription};
use async_shell::shell::Shell;

#[tokio::test]
async fn plain_launch_returns_nonzero_status_as_data() {
    init_tracing();

    let status = with_timeout(sh("false").launch().status()).await.unwrap();
    assert_eq!(status, 1);

    let status = with_timeout(sh("exit 7").launch().status()).await.unwrap();
    assert_eq!(status, 7);
}

#[tokio::test]
async fn joint_launch_fails_with_process_status() {
    init_tracing();

    let result = with_timeout(
        sh("false")
            .launch()
            .and_perform(async { Ok::<_, Error>("sidework result") }),
    )
    .await;

    match result {
        Err(Error::Exit(ProcessError { status })) => assert_eq!(status, 1),
        other => panic!("expected exit failure, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_process_still_lets_sidework_finish() {
    init_tracing();

    let completed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&completed);

    let result = with_timeout(sh("exit 1").launch().and_perform(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        flag.store(true, Ordering::SeqCst);
        Ok::<_, Error>(())
    }))
    .await;

    assert!(matches!(result, Err(Error::Exit(ProcessError { status: 1 }))));
    // Observed as soon as the failure is returned, without any extra wait.
    assert!(completed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn joint_launch_returns_sidework_result_on_success() {
    init_tracing();

    let value = with_timeout(
        sh("true")
            .launch()
            .and_perform(async { Ok::<_, Error>(42) }),
    )
    .await
    .unwrap();
    assert_eq!(value, 42);
}

#[tokio::test]
async fn joint_launch_surfaces_sidework_failure_after_clean_exit() {
    init_tracing();

    let result: Result<(), anyhow::Error> = with_timeout(
        sh("true")
            .launch()
            .and_perform(async { Err(anyhow::anyhow!("sidework broke")) }),
    )
    .await;
    assert_eq!(result.unwrap_err().to_string(), "sidework broke");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sidework_drains_pipe_while_process_runs() {
    init_tracing();

    let (mut reader, writer) = Pipe::new().unwrap().into_parts();

    // Far more than a pipe buffer; waiting for exit before reading would hang.
    let drained = with_timeout(
        sh("head -c 1000000 /dev/zero")
            .launch()
            .stdout(writer)
            .and_perform(async move {
                tokio::task::spawn_blocking(move || {
                    let mut data = Vec::new();
                    reader.read_to_end(&mut data).map(|_| data.len())
                })
                .await
                .expect("reader task panicked")
                .map_err(Error::from)
            }),
    )
    .await
    .unwrap();

    assert_eq!(drained, 1_000_000);
}

#[tokio::test]
async fn missing_input_file_fails_before_process_starts() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("started");
    let missing = dir.path().join("missing.txt");

    let result = sh(&format!("touch '{}'", marker.display()))
        .launch()
        .stdin(missing.clone())
        .status()
        .await;

    match result {
        Err(Error::Resolve { endpoint, .. }) => {
            assert!(endpoint.contains("missing.txt"));
        }
        other => panic!("expected resolve failure, got {other:?}"),
    }
    assert!(!marker.exists());
}

#[tokio::test]
async fn file_endpoints_feed_and_receive_streams() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.txt");
    std::fs::write(&input, "one\ntwo\n").unwrap();

    let status = with_timeout(
        sh("tr a-z A-Z")
            .launch()
            .stdin(input.as_path())
            .stdout(output.clone())
            .status(),
    )
    .await
    .unwrap();

    assert_eq!(status, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "ONE\nTWO\n");
}

#[tokio::test]
async fn null_stdin_reads_as_empty() {
    let out = with_timeout(sh("wc -c").launch().stdin(Endpoint::Null).read_string())
        .await
        .unwrap();
    assert_eq!(out.trim(), "0");
}

#[tokio::test]
async fn description_environment_replaces_inherited_one() {
    init_tracing();

    let description = ProcessDescription::new(Shell::SH.executable().unwrap())
        .args(["-c", "printf '%s|%s' \"$GREETING\" \"$HOME\""])
        .environment([("GREETING", "hi")]);

    let out = with_timeout(description.launch().read_string()).await.unwrap();
    assert_eq!(out, "hi|");
}

#[tokio::test]
async fn shell_command_env_overrides_inherited_environment() {
    init_tracing();

    let out = with_timeout(
        sh("printf '%s' \"$ASYNC_SHELL_GREETING\"")
            .env("ASYNC_SHELL_GREETING", "hello")
            .launch()
            .read_string(),
    )
    .await
    .unwrap();
    assert_eq!(out, "hello");
}

#[tokio::test]
async fn signal_termination_reports_shell_style_status() {
    init_tracing();

    let status = with_timeout(sh("kill -9 $$").launch().status()).await.unwrap();
    assert_eq!(status, 128 + 9);
}

#[tokio::test]
async fn unknown_program_fails_to_spawn() {
    let err = ProcessDescription::new("/definitely/not/a/program")
        .launch()
        .status()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Spawn { ref program, .. } if program.contains("not/a/program")));
}

#[tokio::test]
async fn unknown_shell_fails_before_spawning() {
    let err = sh("true")
        .with_shell("no-such-shell-here")
        .launch()
        .status()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ExecutableNotFound(_)));
}

#[tokio::test]
async fn running_process_wait_is_repeatable() {
    init_tracing();

    let mut process = sh("exit 3").launch().spawn().unwrap();
    assert!(process.id().is_some());
    assert_eq!(with_timeout(process.wait()).await.unwrap(), 3);
    assert_eq!(process.wait().await.unwrap(), 3);
    assert_eq!(process.try_status(), Some(3));
}
