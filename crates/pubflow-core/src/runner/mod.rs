//! External command execution.
//!
//! Build, publish, registry lookups, linking and packing all shell out to the
//! package manager. Stages only see the [`CommandRunner`] trait so tests can
//! substitute a scripted fake.

pub mod process;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

pub use process::{OutputMode, ProcessRunner};

/// Captured output of a finished command.
///
/// Empty when the runner streams output straight to the terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {}s", .timeout.as_secs_f32())]
    Timeout { command: String, timeout: Duration },

    #[error("`{command}` failed ({status}){}", stderr_suffix(.stderr))]
    Exit {
        command: String,
        status: String,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// The external package-manager operations the workflow depends on.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Build the package in `dir`.
    async fn build(&self, dir: &Path) -> Result<CommandOutput, RunnerError>;

    /// Publish the package in `dir` to the registry.
    async fn publish(&self, dir: &Path) -> Result<CommandOutput, RunnerError>;

    /// Ask the registry for `name` (latest) or `name@version`.
    ///
    /// Returns the version the registry reports, or `None` when the package
    /// or the exact version does not exist.
    async fn query_version(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<Option<String>, RunnerError>;

    /// Register the package in `dir` as a global link.
    async fn link(&self, dir: &Path) -> Result<CommandOutput, RunnerError>;

    /// Produce a tarball of the package in `dir` inside `destination`.
    async fn pack(&self, dir: &Path, destination: &Path) -> Result<CommandOutput, RunnerError>;
}
