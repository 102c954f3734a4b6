//! Integration tests for process-isolated cell execution.
//!
//! Cells run under `sh -c` so these tests do not need Python installed.

#![cfg(unix)]

use std::fs;
use std::time::{Duration, Instant};

use quire_core::execute::{NO_ERROR_OUTPUT, NO_OUTPUT, TIMEOUT_MESSAGE};
use quire_core::{CellRunner, ExecutionStatus, Interpreter};
use tempfile::TempDir;

fn shell_runner() -> CellRunner {
    CellRunner::new(Interpreter::shell())
}

#[tokio::test]
async fn test_success_captures_stdout() {
    let outcome = shell_runner()
        .run("echo $((2 + 2))", Duration::from_secs(5))
        .await;

    assert_eq!(outcome.status, ExecutionStatus::Success);
    assert_eq!(outcome.output, "4\n");
}

#[tokio::test]
async fn test_success_without_stdout() {
    let outcome = shell_runner()
        .run("echo ignored >&2", Duration::from_secs(5))
        .await;

    assert_eq!(outcome.status, ExecutionStatus::Success);
    assert_eq!(outcome.output, NO_OUTPUT);
}

#[tokio::test]
async fn test_nonzero_exit_captures_stderr() {
    let outcome = shell_runner()
        .run("echo partial; echo 'ValueError: fail' >&2; exit 3", Duration::from_secs(5))
        .await;

    assert_eq!(outcome.status, ExecutionStatus::Error);
    assert_eq!(outcome.output, "ValueError: fail\n");
}

#[tokio::test]
async fn test_nonzero_exit_without_stderr() {
    let outcome = shell_runner().run("exit 1", Duration::from_secs(5)).await;

    assert_eq!(outcome.status, ExecutionStatus::Error);
    assert_eq!(outcome.output, NO_ERROR_OUTPUT);
}

#[tokio::test]
async fn test_each_run_starts_clean() {
    let runner = shell_runner();
    let first = runner.run("X=42; echo $X", Duration::from_secs(5)).await;
    let second = runner.run("echo \"[${X:-unset}]\"", Duration::from_secs(5)).await;

    assert_eq!(first.output, "42\n");
    assert_eq!(second.output, "[unset]\n");
}

#[tokio::test]
async fn test_large_output_does_not_deadlock() {
    // Well past the pipe buffer size on both streams
    let source = "i=0; while [ $i -lt 20000 ]; do echo line-$i; echo err-$i >&2; i=$((i+1)); done";
    let outcome = shell_runner().run(source, Duration::from_secs(30)).await;

    assert_eq!(outcome.status, ExecutionStatus::Success);
    assert_eq!(outcome.output.lines().count(), 20000);
}

#[tokio::test]
async fn test_timeout_kills_process() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let pid_file = temp.path().join("pid");

    let source = format!("echo $$ > '{}'; sleep 30", pid_file.display());
    let start = Instant::now();
    let outcome = shell_runner().run(&source, Duration::from_secs(1)).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome.status, ExecutionStatus::Timeout);
    assert_eq!(outcome.output, TIMEOUT_MESSAGE);
    assert!(
        elapsed < Duration::from_secs(10),
        "Timeout took too long ({:?})",
        elapsed
    );

    let pid: libc::pid_t = fs::read_to_string(&pid_file)
        .expect("cell should have written its pid")
        .trim()
        .parse()
        .expect("pid should be numeric");

    // SAFETY: signal 0 only checks for existence.
    let alive = unsafe { libc::kill(pid, 0) } == 0;
    assert!(!alive, "cell process {} still running after timeout", pid);
}

/// Whether `pid` is a live, non-zombie process.
///
/// An orphaned child may linger as a zombie when nothing reaps it.
#[cfg(target_os = "linux")]
fn is_running(pid: libc::pid_t) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next())
            .is_some_and(|state| state != 'Z' && state != 'X'),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timeout_kills_background_children() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let pid_file = temp.path().join("child_pid");

    let source = format!(
        "sleep 30 & echo $! > '{}'; wait",
        pid_file.display()
    );
    let outcome = shell_runner().run(&source, Duration::from_secs(1)).await;
    assert_eq!(outcome.status, ExecutionStatus::Timeout);

    let pid: libc::pid_t = fs::read_to_string(&pid_file)
        .expect("cell should have written the child pid")
        .trim()
        .parse()
        .expect("pid should be numeric");

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if !is_running(pid) {
            break;
        }
        assert!(Instant::now() < deadline, "background child {} survived timeout", pid);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
#[ignore = "Requires python3 on PATH"]
async fn test_python_cell() {
    let runner = CellRunner::new(Interpreter::detect());
    let outcome = runner.run("x = 2 + 2\nprint(x)", Duration::from_secs(10)).await;

    assert_eq!(outcome.status, ExecutionStatus::Success);
    assert!(outcome.output.contains('4'));

    let outcome = runner.run("raise ValueError('fail')", Duration::from_secs(10)).await;
    assert_eq!(outcome.status, ExecutionStatus::Error);
    assert!(outcome.output.contains("ValueError"));
}
