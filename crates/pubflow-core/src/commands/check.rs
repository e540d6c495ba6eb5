//! Check command: scan, classify against the registry, record.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;

use crate::artifact::{StatusArtifact, StatusRecorder};
use crate::config::CheckMode;
use crate::context::{WorkspaceContext, runtime};
use crate::registry::{RegistryQuery, StatusChecker};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Override the configured check mode
    pub mode: Option<CheckMode>,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: CheckMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Result of a check run
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub artifact: StatusArtifact,
    /// Where the artifact was written
    pub path: PathBuf,
    pub mode: CheckMode,
}

impl CheckReport {
    pub fn unknown_count(&self) -> usize {
        self.artifact.unknown().count()
    }
}

/// Runs the scanner, the status checker and the status recorder in order.
pub struct CheckCommand<'a> {
    ctx: &'a WorkspaceContext,
    registry: &'a dyn RegistryQuery,
}

impl<'a> CheckCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext, registry: &'a dyn RegistryQuery) -> Self {
        Self { ctx, registry }
    }

    pub fn execute(&self, options: &CheckOptions) -> anyhow::Result<CheckReport> {
        let mode = options.mode.unwrap_or(self.ctx.config().registry.check_mode);
        let packages = self.ctx.scanner().scan()?;

        let checker = StatusChecker::new(self.registry, mode)
            .with_delay(self.ctx.config().registry.query_delay());
        tracing::info!(count = packages.len(), ?mode, "checking registry status");
        let entries = runtime()?.block_on(checker.check(&packages));

        let artifact = StatusArtifact::from_entries(entries, Utc::now());
        let path = self.ctx.status_path();
        StatusRecorder::new(self.ctx.store(), &path)
            .record(&artifact)
            .context("Failed to persist status artifact")?;
        tracing::info!(path = %path.display(), "status artifact written");

        Ok(CheckReport {
            artifact,
            path,
            mode,
        })
    }
}
