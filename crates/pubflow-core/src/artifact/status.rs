//! Status artifact: the snapshot handed from `check` to `publish`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::fs::FileStore;
use crate::types::{PackageDescriptor, PackageRef};

/// Registry version recorded for a package the registry has never seen.
pub const NEVER_PUBLISHED: &str = "none";

/// Classification state of one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationState {
    Published,
    Unpublished,
    Unknown,
}

/// Result of asking the registry about one package.
///
/// Each variant carries exactly the data its state allows: a registry
/// version for a definite answer, an error for a failed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationStatus {
    Published { registry_version: String },
    Unpublished { registry_version: String },
    Unknown { error: String },
}

impl PublicationStatus {
    pub fn published(registry_version: impl Into<String>) -> Self {
        Self::Published {
            registry_version: registry_version.into(),
        }
    }

    pub fn unpublished(registry_version: impl Into<String>) -> Self {
        Self::Unpublished {
            registry_version: registry_version.into(),
        }
    }

    pub fn never_published() -> Self {
        Self::unpublished(NEVER_PUBLISHED)
    }

    pub fn unknown(error: impl Into<String>) -> Self {
        Self::Unknown {
            error: error.into(),
        }
    }

    pub fn state(&self) -> PublicationState {
        match self {
            Self::Published { .. } => PublicationState::Published,
            Self::Unpublished { .. } => PublicationState::Unpublished,
            Self::Unknown { .. } => PublicationState::Unknown,
        }
    }

    pub fn registry_version(&self) -> Option<&str> {
        match self {
            Self::Published { registry_version } | Self::Unpublished { registry_version } => {
                Some(registry_version)
            }
            Self::Unknown { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Unknown { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// One package in the status artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStatusEntry", into = "RawStatusEntry")]
pub struct StatusEntry {
    pub name: String,
    /// Package directory relative to the packages directory.
    pub dir: PathBuf,
    pub local_version: String,
    pub status: PublicationStatus,
    /// Every version the registry listed, when known.
    pub all_versions: Vec<String>,
}

impl StatusEntry {
    pub fn new(package: &PackageDescriptor, status: PublicationStatus) -> Self {
        Self {
            name: package.name.clone(),
            dir: package.directory.clone(),
            local_version: package.local_version.clone(),
            status,
            all_versions: Vec::new(),
        }
    }

    pub fn with_versions(mut self, versions: Vec<String>) -> Self {
        self.all_versions = versions;
        self
    }

    pub fn package_ref(&self) -> PackageRef {
        PackageRef {
            name: self.name.clone(),
            version: self.local_version.clone(),
        }
    }
}

/// On-disk shape of an entry.
///
/// `state` may be absent in artifacts written by older tooling; it is then
/// inferred: an `error` means Unknown, a registry version means Published,
/// neither means never published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatusEntry {
    name: String,
    dir: PathBuf,
    local_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<PublicationState>,
    #[serde(
        default,
        alias = "npmVersion",
        alias = "latestVersion",
        skip_serializing_if = "Option::is_none"
    )]
    registry_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    all_versions: Vec<String>,
}

impl TryFrom<RawStatusEntry> for StatusEntry {
    type Error = String;

    fn try_from(raw: RawStatusEntry) -> Result<Self, Self::Error> {
        let state = raw.state.unwrap_or(match (&raw.error, &raw.registry_version) {
            (Some(_), _) => PublicationState::Unknown,
            (None, Some(_)) => PublicationState::Published,
            (None, None) => PublicationState::Unpublished,
        });

        let status = match (state, raw.registry_version, raw.error) {
            (PublicationState::Unknown, None, Some(error)) => PublicationStatus::Unknown { error },
            (PublicationState::Unknown, _, _) => {
                return Err(format!(
                    "{}: Unknown state requires an error and no registryVersion",
                    raw.name
                ));
            }
            (_, _, Some(_)) => {
                return Err(format!(
                    "{}: {:?} state cannot carry an error",
                    raw.name, state
                ));
            }
            (PublicationState::Published, Some(version), None) => {
                PublicationStatus::published(version)
            }
            (PublicationState::Published, None, None) => {
                return Err(format!(
                    "{}: Published state requires a registryVersion",
                    raw.name
                ));
            }
            (PublicationState::Unpublished, version, None) => {
                PublicationStatus::unpublished(version.unwrap_or_else(|| NEVER_PUBLISHED.into()))
            }
        };

        Ok(StatusEntry {
            name: raw.name,
            dir: raw.dir,
            local_version: raw.local_version,
            status,
            all_versions: raw.all_versions,
        })
    }
}

impl From<StatusEntry> for RawStatusEntry {
    fn from(entry: StatusEntry) -> Self {
        let state = entry.status.state();
        let (registry_version, error) = match entry.status {
            PublicationStatus::Published { registry_version }
            | PublicationStatus::Unpublished { registry_version } => (Some(registry_version), None),
            PublicationStatus::Unknown { error } => (None, Some(error)),
        };
        RawStatusEntry {
            name: entry.name,
            dir: entry.dir,
            local_version: entry.local_version,
            state: Some(state),
            registry_version,
            error,
            all_versions: entry.all_versions,
        }
    }
}

/// Snapshot of one `check` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusArtifact {
    /// Entries whose state is Published, in scan order.
    pub published: Vec<StatusEntry>,
    /// Entries whose state is Unpublished or Unknown, in scan order.
    pub unpublished: Vec<StatusEntry>,
    pub timestamp: DateTime<Utc>,
}

impl StatusArtifact {
    /// Partition classified entries, keeping their relative order.
    pub fn from_entries(entries: Vec<StatusEntry>, timestamp: DateTime<Utc>) -> Self {
        let (published, unpublished) = entries
            .into_iter()
            .partition(|entry| entry.status.is_published());
        Self {
            published,
            unpublished,
            timestamp,
        }
    }

    pub fn total(&self) -> usize {
        self.published.len() + self.unpublished.len()
    }

    /// Entries whose registry query failed.
    pub fn unknown(&self) -> impl Iterator<Item = &StatusEntry> {
        self.unpublished
            .iter()
            .filter(|entry| entry.status.state() == PublicationState::Unknown)
    }

    /// Check that every entry sits in the list its state belongs to.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(entry) = self.published.iter().find(|e| !e.status.is_published()) {
            return Err(format!(
                "'{}' is listed as published but its state is {:?}",
                entry.name,
                entry.status.state()
            ));
        }
        if let Some(entry) = self.unpublished.iter().find(|e| e.status.is_published()) {
            return Err(format!(
                "'{}' is listed as unpublished but its state is Published",
                entry.name
            ));
        }
        Ok(())
    }
}

/// Writes and reads the status artifact at a fixed path.
pub struct StatusRecorder<'a> {
    store: &'a dyn FileStore,
    path: PathBuf,
}

impl<'a> StatusRecorder<'a> {
    pub fn new(store: &'a dyn FileStore, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the artifact with `artifact`. Any failure is fatal to the
    /// stage; nothing is merged with prior content.
    pub fn record(&self, artifact: &StatusArtifact) -> Result<(), ArtifactError> {
        let mut json = serde_json::to_string_pretty(artifact)?;
        json.push('\n');
        self.store
            .write_atomic(&self.path, &json)
            .map_err(|source| ArtifactError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), entries = artifact.total(), "status artifact written");
        Ok(())
    }

    pub fn load(&self) -> Result<StatusArtifact, ArtifactError> {
        if !self.store.exists(&self.path) {
            return Err(ArtifactError::Missing {
                path: self.path.clone(),
            });
        }
        let content =
            self.store
                .read_to_string(&self.path)
                .map_err(|source| ArtifactError::Read {
                    path: self.path.clone(),
                    source,
                })?;
        let artifact: StatusArtifact =
            serde_json::from_str(&content).map_err(|e| ArtifactError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        artifact
            .validate()
            .map_err(|reason| ArtifactError::Malformed {
                path: self.path.clone(),
                reason,
            })?;
        Ok(artifact)
    }
}
