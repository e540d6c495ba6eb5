//! Registry access through the package manager's `view` command.

use std::sync::Arc;

use async_trait::async_trait;

use super::{RegistryError, RegistryQuery, RegistryRecord};
use crate::runner::CommandRunner;

/// Answers lookups with `view <name> version` and
/// `view <name>@<version> version`.
pub struct CliRegistry {
    runner: Arc<dyn CommandRunner>,
}

impl CliRegistry {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl RegistryQuery for CliRegistry {
    async fn lookup(&self, name: &str) -> Result<Option<RegistryRecord>, RegistryError> {
        let latest = self.runner.query_version(name, None).await?;
        Ok(latest.map(|latest| RegistryRecord {
            latest: Some(latest),
            versions: None,
        }))
    }

    async fn has_version(&self, name: &str, version: &str) -> Result<bool, RegistryError> {
        Ok(self
            .runner
            .query_version(name, Some(version))
            .await?
            .is_some())
    }
}
