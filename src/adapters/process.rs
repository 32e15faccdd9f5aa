use crate::domain::model::ProcessOutput;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Splits a configured command such as `python -m graphrag` into the program
/// and the arguments that precede the subcommand.
pub fn split_command(command: &str) -> (String, Vec<String>) {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_default();
    (program, parts.collect())
}

#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput> {
        let (program, mut full_args) = split_command(program);
        full_args.extend(args.iter().cloned());

        tracing::debug!("Running {} {:?} in {}", program, full_args, cwd.display());

        let mut command = Command::new(&program);
        command
            .args(&full_args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BridgeError::CommandNotFound { program });
            }
            Ok(Err(e)) => return Err(BridgeError::IoError(e)),
            Err(_) => {
                tracing::warn!("⏱️ {} exceeded {:?}, killed", program, timeout);
                return Err(BridgeError::Timeout {
                    program,
                    seconds: timeout.as_secs(),
                });
            }
        };

        let result = ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!("{} exited with code {}", program, result.exit_code);
        Ok(result)
    }
}
