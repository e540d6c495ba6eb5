//! Workspace context shared by every command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::config::{ConfigStore, PubflowConfig, RegistryBackend};
use crate::fs::{FileStore, OsFileStore};
use crate::publish::PublishMode;
use crate::registry::{CliRegistry, HttpRegistry, RegistryQuery};
use crate::runner::{CommandRunner, ProcessRunner};
use crate::workspace::{MANIFEST_FILE, Scanner};

/// Root directory, loaded configuration and file access for one invocation.
///
/// Frontends create this once and hand it to commands.
#[derive(Clone)]
pub struct WorkspaceContext {
    root: PathBuf,
    config: PubflowConfig,
    store: Arc<dyn FileStore>,
}

impl std::fmt::Debug for WorkspaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceContext")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkspaceContext {
    /// Load `pubflow.toml` from `root` (defaults when absent) and use the
    /// real filesystem.
    pub fn load(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        let config = ConfigStore::for_root(&root)
            .load()
            .with_context(|| format!("Failed to load configuration for {}", root.display()))?;
        Ok(Self::with_store(root, config, Arc::new(OsFileStore)))
    }

    pub fn with_store(root: PathBuf, config: PubflowConfig, store: Arc<dyn FileStore>) -> Self {
        Self {
            root,
            config,
            store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PubflowConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn FileStore {
        self.store.as_ref()
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(&self.config.packages_dir)
    }

    pub fn root_manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.root.join(&self.config.status_file)
    }

    pub fn results_path(&self, mode: PublishMode) -> PathBuf {
        match mode {
            PublishMode::Batch => self.root.join(&self.config.results_file),
            PublishMode::Interactive => self.root.join(&self.config.interactive_results_file),
        }
    }

    pub fn pack_dir(&self) -> PathBuf {
        self.root.join(&self.config.publish.pack_dir)
    }

    pub fn scanner(&self) -> Scanner<'_> {
        Scanner::new(self.store(), self.packages_dir()).with_exclude(self.config.exclude.clone())
    }

    /// Subprocess runner for the configured commands.
    pub fn process_runner(&self) -> Arc<ProcessRunner> {
        Arc::new(ProcessRunner::new(self.config.commands.clone()))
    }

    /// Registry client for the configured backend.
    pub fn registry(
        &self,
        runner: Arc<dyn CommandRunner>,
    ) -> anyhow::Result<Box<dyn RegistryQuery>> {
        let registry: Box<dyn RegistryQuery> = match self.config.registry.backend {
            RegistryBackend::Http => Box::new(HttpRegistry::new(self.config.registry.base_url()?)?),
            RegistryBackend::Cli => Box::new(CliRegistry::new(runner)),
        };
        Ok(registry)
    }
}

/// Current-thread runtime for driving async stages from synchronous commands.
pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")
}
