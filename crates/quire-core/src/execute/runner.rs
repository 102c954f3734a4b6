//! Process-isolated, time-bounded cell runner.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::config::Interpreter;

use super::ExecutionStatus;

/// Output recorded for a timed-out cell.
pub const TIMEOUT_MESSAGE: &str = "Execution timed out";

/// Output recorded for a successful cell that printed nothing.
pub const NO_OUTPUT: &str = "(no output)";

/// Output recorded for a failed cell that wrote nothing to stderr.
pub const NO_ERROR_OUTPUT: &str = "(error)";

/// Result of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Captured text: stdout on success, stderr on error, or a fixed message.
    pub output: String,
    pub status: ExecutionStatus,
}

impl RunOutcome {
    fn error(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            status: ExecutionStatus::Error,
        }
    }

    fn timeout() -> Self {
        Self {
            output: TIMEOUT_MESSAGE.to_string(),
            status: ExecutionStatus::Timeout,
        }
    }

    /// Classify a completed process from its exit status and captured streams.
    pub fn from_exit(success: bool, stdout: &[u8], stderr: &[u8]) -> Self {
        if success {
            Self {
                output: text_or(stdout, NO_OUTPUT),
                status: ExecutionStatus::Success,
            }
        } else {
            Self::error(text_or(stderr, NO_ERROR_OUTPUT))
        }
    }
}

fn text_or(bytes: &[u8], placeholder: &str) -> String {
    if bytes.is_empty() {
        placeholder.to_string()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Runs cell source in a fresh interpreter process per call.
///
/// There is no shared state between runs and no retry: each call spawns
/// exactly one process and waits for it (or kills it) before returning.
#[derive(Debug, Clone)]
pub struct CellRunner {
    interpreter: Interpreter,
}

impl CellRunner {
    /// Create a runner for the given interpreter.
    pub fn new(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    /// Run `source` with a timeout and classify the outcome.
    pub async fn run(&self, source: &str, timeout: Duration) -> RunOutcome {
        let mut command = Command::new(&self.interpreter.program);
        command
            .args(&self.interpreter.args)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout also takes down anything the cell spawned
        #[cfg(unix)]
        command.process_group(0);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(
                    "Failed to spawn '{}': {}",
                    self.interpreter.program.display(),
                    e
                );
                return RunOutcome::error(format!(
                    "Failed to start '{}': {}",
                    self.interpreter.program.display(),
                    e
                ));
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let waited = tokio::time::timeout(timeout, async {
            tokio::try_join!(drain(stdout), drain(stderr), child.wait())
        })
        .await;

        match waited {
            Ok(Ok((out, err, status))) => {
                tracing::debug!("Cell process exited: {}", describe_exit(status));
                RunOutcome::from_exit(status.success(), &out, &err)
            }
            Ok(Err(e)) => {
                terminate(&mut child).await;
                RunOutcome::error(format!("Failed to collect cell output: {}", e))
            }
            Err(_) => {
                tracing::warn!("Cell exceeded timeout of {:?}, killing", timeout);
                terminate(&mut child).await;
                RunOutcome::timeout()
            }
        }
    }
}

/// Read a pipe to the end. A missing pipe reads as empty.
async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// SIGKILL the child's process group, then kill and reap the child itself.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: plain signal delivery; the group id is the child's pid because
        // it was spawned with process_group(0) and has not been reaped yet.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }

    if let Err(e) = child.kill().await {
        tracing::warn!("Failed to kill cell process: {}", e);
    }
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
