//! Build-and-publish loop over the unpublished entries of a status artifact.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::prompter::{Decision, Prompter};
use crate::artifact::{OutcomeResult, PublicationOutcome, PublicationState, StatusEntry};
use crate::runner::{CommandRunner, RunnerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    Batch,
    Interactive,
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("build failed: {0}")]
    Build(#[source] RunnerError),

    #[error("publish failed: {0}")]
    Publish(#[source] RunnerError),
}

/// Outcomes of one publish run, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRun {
    pub mode: PublishMode,
    pub outcomes: Vec<PublicationOutcome>,
    /// The operator stopped the run before every entry was visited.
    pub aborted: bool,
}

impl PublishRun {
    fn empty(mode: PublishMode) -> Self {
        Self {
            mode,
            outcomes: Vec::new(),
            aborted: false,
        }
    }

    fn count(&self, pred: impl Fn(&OutcomeResult) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.result)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|r| matches!(r, OutcomeResult::Succeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, OutcomeResult::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, OutcomeResult::Skipped))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_failures() { 1 } else { 0 }
    }

    fn interrupt(mut self, error: anyhow::Error) -> PublishInterrupted {
        self.aborted = true;
        PublishInterrupted { run: self, error }
    }
}

/// A prompt failed mid-run. `run` holds every outcome recorded before it,
/// with `aborted` set.
#[derive(Debug)]
pub struct PublishInterrupted {
    pub run: PublishRun,
    pub error: anyhow::Error,
}

pub struct Publisher<'a> {
    runner: &'a dyn CommandRunner,
    packages_dir: PathBuf,
    pacing: Duration,
}

impl<'a> Publisher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            packages_dir: packages_dir.into(),
            pacing: Duration::ZERO,
        }
    }

    /// Pause between successive batch publishes.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Publish every entry in order. With a prompter the run is interactive.
    ///
    /// Only prompt I/O errors fail the run, and they still hand back the
    /// outcomes recorded so far. Build and publish failures are outcomes.
    pub async fn run(
        &self,
        entries: &[StatusEntry],
        prompter: Option<&mut dyn Prompter>,
    ) -> Result<PublishRun, PublishInterrupted> {
        match prompter {
            Some(prompter) => self.run_interactive(entries, prompter).await,
            None => Ok(self.run_batch(entries).await),
        }
    }

    async fn run_batch(&self, entries: &[StatusEntry]) -> PublishRun {
        let mut run = PublishRun::empty(PublishMode::Batch);

        for (index, entry) in entries.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            tracing::info!(
                "[{}/{}] publishing {}@{}",
                index + 1,
                entries.len(),
                entry.name,
                entry.local_version
            );
            let outcome = match self.publish_one(entry).await {
                Ok(()) => PublicationOutcome::succeeded(entry.package_ref()),
                Err(err) => PublicationOutcome::failed(entry.package_ref(), err.to_string()),
            };
            run.outcomes.push(outcome);
        }

        run
    }

    async fn run_interactive(
        &self,
        entries: &[StatusEntry],
        prompter: &mut dyn Prompter,
    ) -> Result<PublishRun, PublishInterrupted> {
        let mut run = PublishRun::empty(PublishMode::Interactive);

        for (index, entry) in entries.iter().enumerate() {
            let decision = match prompter.confirm(entry, index + 1, entries.len()) {
                Ok(decision) => decision,
                Err(error) => return Err(run.interrupt(error)),
            };
            match decision {
                Decision::Abort => {
                    tracing::info!("publishing stopped by operator");
                    run.aborted = true;
                    break;
                }
                Decision::Skip => {
                    tracing::info!(package = %entry.name, "skipped");
                    run.outcomes
                        .push(PublicationOutcome::skipped(entry.package_ref()));
                    continue;
                }
                Decision::Proceed => {}
            }

            match self.publish_one(entry).await {
                Ok(()) => run
                    .outcomes
                    .push(PublicationOutcome::succeeded(entry.package_ref())),
                Err(err) => {
                    let error = err.to_string();
                    run.outcomes
                        .push(PublicationOutcome::failed(entry.package_ref(), &error));
                    if index + 1 == entries.len() {
                        continue;
                    }
                    match prompter.continue_after_failure(entry, &error) {
                        Ok(true) => {}
                        Ok(false) => {
                            tracing::info!("publishing stopped after failure");
                            run.aborted = true;
                            break;
                        }
                        Err(error) => return Err(run.interrupt(error)),
                    }
                }
            }
        }

        Ok(run)
    }

    /// Build, then publish on success.
    async fn publish_one(&self, entry: &StatusEntry) -> Result<(), StepError> {
        if entry.status.state() == PublicationState::Unknown {
            tracing::warn!(
                package = %entry.name,
                "registry status unknown, attempting publish anyway"
            );
        }
        let dir = self.package_dir(&entry.dir);

        tracing::info!(package = %entry.name, "building");
        self.runner.build(&dir).await.map_err(StepError::Build)?;

        tracing::info!(package = %entry.name, "publishing");
        self.runner.publish(&dir).await.map_err(StepError::Publish)?;

        tracing::info!(package = %entry.name, version = %entry.local_version, "published");
        Ok(())
    }

    fn package_dir(&self, dir: &Path) -> PathBuf {
        self.packages_dir.join(dir)
    }
}
