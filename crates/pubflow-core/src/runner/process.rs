//! [`CommandRunner`] backed by real subprocesses.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::{CommandOutput, CommandRunner, RunnerError};
use crate::config::CommandSettings;

/// Where long-running commands send their output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Stream to the terminal so the operator can follow the build.
    #[default]
    Inherit,
    /// Capture stdout/stderr into [`CommandOutput`].
    Capture,
}

/// Runs the configured argv vectors with a per-invocation timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    commands: CommandSettings,
    timeout: Duration,
    output: OutputMode,
}

impl ProcessRunner {
    pub fn new(commands: CommandSettings) -> Self {
        let timeout = commands.timeout();
        Self {
            commands,
            timeout,
            output: OutputMode::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    async fn run(
        &self,
        argv: &[String],
        extra_args: &[String],
        dir: Option<&Path>,
        output_mode: OutputMode,
    ) -> Result<CommandOutput, RunnerError> {
        let (program, args) = argv.split_first().ok_or(RunnerError::EmptyCommand)?;
        let command_line = argv
            .iter()
            .chain(extra_args)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let mut command = Command::new(program);
        command.args(args).args(extra_args).kill_on_drop(true);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        match output_mode {
            OutputMode::Capture => {
                command
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
        }

        tracing::debug!(command = %command_line, dir = ?dir, "spawning");
        let child = command.spawn().map_err(|source| RunnerError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        // Dropping the child on timeout kills it (kill_on_drop).
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| RunnerError::Wait {
                command: command_line.clone(),
                source,
            })?,
            Err(_) => {
                return Err(RunnerError::Timeout {
                    command: command_line,
                    timeout: self.timeout,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(RunnerError::Exit {
                command: command_line,
                status,
                stderr: if stderr.trim().is_empty() {
                    stdout
                } else {
                    stderr
                },
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn build(&self, dir: &Path) -> Result<CommandOutput, RunnerError> {
        self.run(&self.commands.build, &[], Some(dir), self.output)
            .await
    }

    async fn publish(&self, dir: &Path) -> Result<CommandOutput, RunnerError> {
        self.run(&self.commands.publish, &[], Some(dir), self.output)
            .await
    }

    async fn query_version(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<Option<String>, RunnerError> {
        let spec = match version {
            Some(version) => format!("{}@{}", name, version),
            None => name.to_string(),
        };
        let extra = [spec, "version".to_string()];

        match self
            .run(&self.commands.query, &extra, None, OutputMode::Capture)
            .await
        {
            // `view name@missing-version` succeeds with empty output
            Ok(output) => {
                let reported = output.stdout.trim();
                Ok((!reported.is_empty()).then(|| reported.to_string()))
            }
            Err(RunnerError::Exit { stderr, .. }) if is_not_found(&stderr) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn link(&self, dir: &Path) -> Result<CommandOutput, RunnerError> {
        self.run(&self.commands.link, &[], Some(dir), self.output)
            .await
    }

    async fn pack(&self, dir: &Path, destination: &Path) -> Result<CommandOutput, RunnerError> {
        let extra = [
            "--pack-destination".to_string(),
            destination.to_string_lossy().into_owned(),
        ];
        self.run(&self.commands.pack, &extra, Some(dir), self.output)
            .await
    }
}

fn is_not_found(output: &str) -> bool {
    output.contains("E404") || output.contains("404 Not Found")
}
