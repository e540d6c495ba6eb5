//! Publish command: publish the unpublished entries of the status artifact.

use std::path::PathBuf;

use anyhow::Context;

use crate::artifact::{ResultsArtifact, ResultsRecorder, StatusArtifact, StatusRecorder};
use crate::context::{WorkspaceContext, runtime};
use crate::publish::{Prompter, PublishInterrupted, PublishMode, PublishRun, Publisher};
use crate::runner::CommandRunner;

/// Result of a publish run
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub run: PublishRun,
    /// Entries that were pending in the status artifact
    pub pending: usize,
    /// Results artifact path; `None` when nothing was pending
    pub results_path: Option<PathBuf>,
}

impl PublishReport {
    pub fn nothing_to_publish(&self) -> bool {
        self.pending == 0
    }

    pub fn exit_code(&self) -> i32 {
        self.run.exit_code()
    }
}

pub struct PublishCommand<'a> {
    ctx: &'a WorkspaceContext,
    runner: &'a dyn CommandRunner,
}

impl<'a> PublishCommand<'a> {
    pub fn new(ctx: &'a WorkspaceContext, runner: &'a dyn CommandRunner) -> Self {
        Self { ctx, runner }
    }

    /// Publish every pending entry, continuing past failures.
    pub fn execute_batch(&self) -> anyhow::Result<PublishReport> {
        self.execute(None)
    }

    /// Publish pending entries one at a time, asking `prompter` first.
    pub fn execute_interactive(&self, prompter: &mut dyn Prompter) -> anyhow::Result<PublishReport> {
        self.execute(Some(prompter))
    }

    fn execute(&self, prompter: Option<&mut dyn Prompter>) -> anyhow::Result<PublishReport> {
        let mode = if prompter.is_some() {
            PublishMode::Interactive
        } else {
            PublishMode::Batch
        };
        let artifact = self.load_artifact()?;
        let pending = artifact.unpublished.len();

        if pending == 0 {
            tracing::info!("all packages are already published");
            return Ok(PublishReport {
                run: PublishRun {
                    mode,
                    outcomes: Vec::new(),
                    aborted: false,
                },
                pending,
                results_path: None,
            });
        }

        let unknown = artifact.unknown().count();
        if unknown > 0 {
            tracing::warn!(
                count = unknown,
                "some packages have an unknown registry status and will be attempted"
            );
        }
        tracing::info!(count = pending, ?mode, "publishing unpublished packages");

        let mut publisher = Publisher::new(self.runner, self.ctx.packages_dir());
        if mode == PublishMode::Batch {
            publisher = publisher.with_pacing(self.ctx.config().publish.delay());
        }
        let (run, interrupted) =
            match runtime()?.block_on(publisher.run(&artifact.unpublished, prompter)) {
                Ok(run) => (run, None),
                Err(PublishInterrupted { run, error }) => (run, Some(error)),
            };

        let results = match mode {
            PublishMode::Batch => ResultsArtifact::batch(&run.outcomes),
            PublishMode::Interactive => ResultsArtifact::interactive(&run.outcomes),
        };
        let results_path = self.ctx.results_path(mode);
        ResultsRecorder::new(self.ctx.store(), &results_path)
            .record(&results)
            .context("Failed to write publish results")?;

        if let Some(error) = interrupted {
            return Err(error.context(format!(
                "Interactive publishing interrupted; {} outcomes written to {}",
                run.outcomes.len(),
                results_path.display()
            )));
        }

        tracing::info!(
            succeeded = run.succeeded(),
            failed = run.failed(),
            skipped = run.skipped(),
            "publish run finished"
        );

        Ok(PublishReport {
            run,
            pending,
            results_path: Some(results_path),
        })
    }

    fn load_artifact(&self) -> anyhow::Result<StatusArtifact> {
        let artifact = StatusRecorder::new(self.ctx.store(), self.ctx.status_path()).load()?;
        Ok(artifact)
    }
}
