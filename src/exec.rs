//! Process execution port and its tokio implementation.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::command::CommandDescription;
use crate::error::{Error, Result};

/// Captured result of one finished invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: i32,
    pub stdout: String,
}

/// Runs a single command description and captures its standard output
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    async fn run(&self, command: &CommandDescription) -> Result<ProcessOutput>;
}

/// Spawns the real tool with `tokio::process`, one child per invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn run(&self, command: &CommandDescription) -> Result<ProcessOutput> {
        let output = Command::new(command.executable())
            .args(command.args())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: command.executable().to_string(),
                source,
            })?;

        Ok(ProcessOutput {
            // Terminated by a signal
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Converts the stdout of a failed invocation into an error description
pub type ErrorParser = fn(&str) -> String;

/// Runs `command` and returns its stdout when the exit code is accepted.
///
/// Otherwise fails with [`Error::Execution`], whose message is never empty.
pub async fn execute(
    executor: &dyn ProcessExecutor,
    command: &CommandDescription,
    error_parser: ErrorParser,
) -> Result<String> {
    debug!("Running {}", command);
    let output = executor.run(command).await?;

    if command.accepts(output.code) {
        debug!("{} exited with {}", command.executable(), output.code);
        return Ok(output.stdout);
    }

    let mut message = error_parser(&output.stdout);
    if message.trim().is_empty() {
        message = format!("{} exited with code {}", command, output.code);
    }

    Err(Error::Execution {
        command: command.to_string(),
        code: output.code,
        message,
    })
}
