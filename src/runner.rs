//! Executes submitted code in a child process and grades its stdout.
//!
//! Each run writes the code to its own temp file, starts the interpreter on it,
//! waits at most `timeout`, and removes the file afterwards. Nothing else is
//! restricted: the child can touch the filesystem and network like any process
//! started by this server.

use std::io::Write;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::config::RunnerConfig;
use crate::domain::SubmissionResult;
use crate::error::ExecutionError;

/// Captured result of a finished child.
#[derive(Debug)]
pub struct RunOutput {
  pub status: ExitStatus,
  pub stdout: String,
}

#[derive(Clone, Debug)]
pub struct CodeRunner {
  pub interpreter: String,
  pub timeout: Duration,
}

impl Default for CodeRunner {
  fn default() -> Self {
    Self::from_config(&RunnerConfig::default())
  }
}

impl CodeRunner {
  pub fn from_config(cfg: &RunnerConfig) -> Self {
    Self {
      interpreter: cfg.interpreter.clone(),
      timeout: Duration::from_secs(cfg.timeout_secs),
    }
  }

  /// Run `code` and compare trimmed stdout with trimmed `expected`.
  /// A non-zero exit grades as incorrect but keeps whatever was printed.
  /// Execution failures (temp file, spawn, wait, timeout, cleanup) grade as
  /// incorrect with empty output.
  #[instrument(level = "info", skip(self, code, expected), fields(code_len = code.len(), interpreter = %self.interpreter))]
  pub async fn run_and_check(&self, code: &str, expected: &str) -> SubmissionResult {
    match self.execute(code).await {
      Ok(out) => {
        let actual = out.stdout.trim().to_string();
        let is_correct = out.status.success() && actual == expected.trim();
        debug!(target: "problem", exit = ?out.status.code(), %is_correct, out_len = actual.len(), "Submission graded");
        SubmissionResult { is_correct, actual_output: actual }
      }
      Err(e) => {
        warn!(target: "problem", error = %e, "Submission run failed; grading as incorrect");
        SubmissionResult::failed()
      }
    }
  }

  /// Write `code` to a scoped temp file and run it under the timeout.
  /// The file is removed whether or not the run succeeded.
  pub async fn execute(&self, code: &str) -> Result<RunOutput, ExecutionError> {
    let mut file = tempfile::Builder::new()
      .prefix("adaptipy-")
      .suffix(".py")
      .tempfile()
      .map_err(ExecutionError::TempFile)?;
    file.write_all(code.as_bytes()).map_err(ExecutionError::TempFile)?;
    file.flush().map_err(ExecutionError::TempFile)?;

    let result = self.spawn_and_wait(file.path()).await;

    // `close` surfaces deletion errors that a plain drop would swallow.
    let cleanup = file.close().map_err(ExecutionError::Cleanup);
    let out = result?;
    cleanup?;
    Ok(out)
  }

  async fn spawn_and_wait(&self, path: &std::path::Path) -> Result<RunOutput, ExecutionError> {
    let child = Command::new(&self.interpreter)
      .arg(path)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| ExecutionError::Spawn { program: self.interpreter.clone(), source })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
      Ok(Ok(output)) => Ok(RunOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      }),
      Ok(Err(e)) => Err(ExecutionError::Wait(e)),
      Err(_) => Err(ExecutionError::Timeout(self.timeout)),
    }
  }
}

/// True when `python3` can be started; tests that execute code skip otherwise.
#[cfg(test)]
pub(crate) fn python_available() -> bool {
  std::process::Command::new("python3")
    .arg("--version")
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .status()
    .map(|s| s.success())
    .unwrap_or(false)
}
