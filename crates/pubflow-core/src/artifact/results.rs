//! Publish results artifacts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::fs::FileStore;
use crate::types::PackageRef;

/// What happened to one package during a publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeResult {
    Succeeded,
    Failed { error: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationOutcome {
    pub package: PackageRef,
    pub result: OutcomeResult,
}

impl PublicationOutcome {
    pub fn succeeded(package: PackageRef) -> Self {
        Self {
            package,
            result: OutcomeResult::Succeeded,
        }
    }

    pub fn failed(package: PackageRef, error: impl Into<String>) -> Self {
        Self {
            package,
            result: OutcomeResult::Failed {
                error: error.into(),
            },
        }
    }

    pub fn skipped(package: PackageRef) -> Self {
        Self {
            package,
            result: OutcomeResult::Skipped,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.result {
            OutcomeResult::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPackage {
    pub package: String,
    pub error: String,
}

/// `{ successful: [name], failed: [{ package, error }] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResults {
    pub successful: Vec<String>,
    pub failed: Vec<FailedPackage>,
}

/// `{ published: [name], skipped: [name], failed: [name] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveResults {
    pub published: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultsArtifact {
    Batch(BatchResults),
    Interactive(InteractiveResults),
}

impl ResultsArtifact {
    pub fn batch(outcomes: &[PublicationOutcome]) -> Self {
        let mut results = BatchResults::default();
        for outcome in outcomes {
            match &outcome.result {
                OutcomeResult::Succeeded => results.successful.push(outcome.package.name.clone()),
                OutcomeResult::Failed { error } => results.failed.push(FailedPackage {
                    package: outcome.package.name.clone(),
                    error: error.clone(),
                }),
                OutcomeResult::Skipped => {}
            }
        }
        Self::Batch(results)
    }

    pub fn interactive(outcomes: &[PublicationOutcome]) -> Self {
        let mut results = InteractiveResults::default();
        for outcome in outcomes {
            let name = outcome.package.name.clone();
            match outcome.result {
                OutcomeResult::Succeeded => results.published.push(name),
                OutcomeResult::Failed { .. } => results.failed.push(name),
                OutcomeResult::Skipped => results.skipped.push(name),
            }
        }
        Self::Interactive(results)
    }
}

/// Writes a results artifact, replacing any previous run's.
pub struct ResultsRecorder<'a> {
    store: &'a dyn FileStore,
    path: PathBuf,
}

impl<'a> ResultsRecorder<'a> {
    pub fn new(store: &'a dyn FileStore, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, results: &ResultsArtifact) -> Result<(), ArtifactError> {
        let mut json = serde_json::to_string_pretty(results)?;
        json.push('\n');
        self.store
            .write_atomic(&self.path, &json)
            .map_err(|source| ArtifactError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), "results artifact written");
        Ok(())
    }
}
