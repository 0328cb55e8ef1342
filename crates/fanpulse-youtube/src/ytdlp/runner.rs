//! Subprocess execution behind a trait so listings can be faked in tests.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use fanpulse_core::ListingError;
use tokio::process::Command;

/// What a finished child process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr, for error reports.
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_owned(),
            (out, "") => out.to_owned(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` to completion or until `timeout` elapses.
    ///
    /// # Errors
    ///
    /// [`ListingError::Spawn`] if the process cannot be started and
    /// [`ListingError::Timeout`] if it outlives `timeout`. A non-zero exit is
    /// not an error here; callers inspect [`ProcessOutput::code`].
    async fn run(
        &self,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, ListingError>;
}

/// Runs commands with `tokio::process`. A child that times out is killed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, ListingError> {
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ListingError::Spawn {
                command: command.to_owned(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ListingError::Timeout {
                command: command.to_owned(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })?
            .map_err(|source| ListingError::Spawn {
                command: command.to_owned(),
                source,
            })?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
