//! Registry lookups and publication-status classification
//!
//! The registry is a black box reached either over HTTP ([`HttpRegistry`])
//! or through the package manager's `view` command ([`CliRegistry`]). Both
//! implement [`RegistryQuery`]; [`StatusChecker`] turns their answers into
//! publication statuses.

pub mod checker;
pub mod cli;
pub mod http;

use async_trait::async_trait;

use crate::runner::RunnerError;

pub use checker::StatusChecker;
pub use cli::CliRegistry;
pub use http::HttpRegistry;

/// Reported when the registry knows a package but names no latest version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// What the registry knows about one package name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    /// The `latest` dist-tag, when reported.
    pub latest: Option<String>,
    /// Every published version, or `None` when the backend cannot enumerate
    /// them cheaply.
    pub versions: Option<Vec<String>>,
}

impl RegistryRecord {
    pub fn latest_version(&self) -> &str {
        self.latest
            .as_deref()
            .or_else(|| self.versions.as_ref().and_then(|v| v.last()).map(String::as_str))
            .unwrap_or(UNKNOWN_VERSION)
    }

    /// `Some(found)` when the version list is known, `None` otherwise.
    pub fn knows_version(&self, version: &str) -> Option<bool> {
        self.versions
            .as_ref()
            .map(|versions| versions.iter().any(|v| v == version))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("malformed registry response for {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error(transparent)]
    Tool(#[from] RunnerError),
}

/// Read-only access to the package registry.
#[async_trait]
pub trait RegistryQuery: Send + Sync {
    /// Look up a package by name. `Ok(None)` means the registry has never
    /// heard of it; errors mean the question could not be answered.
    async fn lookup(&self, name: &str) -> Result<Option<RegistryRecord>, RegistryError>;

    /// Whether `name@version` exists in the registry.
    async fn has_version(&self, name: &str, version: &str) -> Result<bool, RegistryError> {
        Ok(self
            .lookup(name)
            .await?
            .and_then(|record| record.knows_version(version))
            .unwrap_or(false))
    }
}
