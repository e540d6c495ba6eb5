#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pubflow_core::artifact::StatusEntry;
use pubflow_core::config::PubflowConfig;
use pubflow_core::context::WorkspaceContext;
use pubflow_core::fs::{FileStore, OsFileStore};
use pubflow_core::publish::{Decision, Prompter};
use pubflow_core::registry::{RegistryError, RegistryQuery, RegistryRecord};
use pubflow_core::runner::{CommandOutput, CommandRunner, RunnerError};

/// Write `packages/<dir>/package.json`.
pub fn write_package(root: &Path, dir: &str, manifest: serde_json::Value) {
    let path = root.join("packages").join(dir).join("package.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut json = serde_json::to_string_pretty(&manifest).unwrap();
    json.push('\n');
    std::fs::write(path, json).unwrap();
}

pub fn write_raw(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Defaults with every pause disabled.
pub fn fast_config() -> PubflowConfig {
    let mut config = PubflowConfig::default();
    config.registry.query_delay_ms = 0;
    config.publish.delay_secs = 0;
    config
}

pub fn context(root: &Path) -> WorkspaceContext {
    context_with(root, fast_config())
}

pub fn context_with(root: &Path, config: PubflowConfig) -> WorkspaceContext {
    WorkspaceContext::with_store(root.to_path_buf(), config, Arc::new(OsFileStore))
}

/// Registry with a fixed set of published versions per name.
#[derive(Default)]
pub struct FakeRegistry {
    packages: HashMap<String, Vec<String>>,
    failing: Vec<String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, versions: &[&str]) -> Self {
        self.packages.insert(
            name.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryQuery for FakeRegistry {
    async fn lookup(&self, name: &str) -> Result<Option<RegistryRecord>, RegistryError> {
        self.lookups.lock().unwrap().push(name.to_string());
        if self.failing.iter().any(|n| n == name) {
            return Err(RegistryError::Malformed {
                name: name.to_string(),
                reason: "unexpected end of input".to_string(),
            });
        }
        Ok(self.packages.get(name).map(|versions| RegistryRecord {
            latest: versions.last().cloned(),
            versions: Some(versions.clone()),
        }))
    }
}

/// Command runner that records calls. Build fails for directories named in
/// `failing_builds`; pack writes a small archive into the destination.
#[derive(Default)]
pub struct FakeRunner {
    failing_builds: Vec<String>,
    failing_links: Vec<String>,
    archive_store: Option<Arc<dyn FileStore>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_build(mut self, dir: &str) -> Self {
        self.failing_builds.push(dir.to_string());
        self
    }

    /// Write packed archives through `store` instead of the real filesystem.
    pub fn packing_into(mut self, store: Arc<dyn FileStore>) -> Self {
        self.archive_store = Some(store);
        self
    }

    pub fn failing_link(mut self, dir: &str) -> Self {
        self.failing_links.push(dir.to_string());
        self
    }

    /// `(operation, package directory name)` in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|(o, _)| o == op).count()
    }

    fn record(&self, op: &str, dir: &Path) -> String {
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), name.clone()));
        name
    }

    fn failure(command: &str, message: String) -> RunnerError {
        RunnerError::Exit {
            command: command.to_string(),
            status: "exit code 1".to_string(),
            stderr: message,
        }
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn build(&self, dir: &Path) -> Result<CommandOutput, RunnerError> {
        let name = self.record("build", dir);
        if self.failing_builds.contains(&name) {
            return Err(Self::failure("pnpm build", format!("type error in {name}")));
        }
        Ok(CommandOutput::default())
    }

    async fn publish(&self, dir: &Path) -> Result<CommandOutput, RunnerError> {
        self.record("publish", dir);
        Ok(CommandOutput::default())
    }

    async fn query_version(
        &self,
        _name: &str,
        _version: Option<&str>,
    ) -> Result<Option<String>, RunnerError> {
        Ok(None)
    }

    async fn link(&self, dir: &Path) -> Result<CommandOutput, RunnerError> {
        let name = self.record("link", dir);
        if self.failing_links.contains(&name) {
            return Err(Self::failure("pnpm link --global", "EACCES".to_string()));
        }
        Ok(CommandOutput::default())
    }

    async fn pack(&self, dir: &Path, destination: &Path) -> Result<CommandOutput, RunnerError> {
        let name = self.record("pack", dir);
        let archive: PathBuf = destination.join(format!("acme-{name}-1.0.0.tgz"));
        match &self.archive_store {
            Some(store) => store.write_atomic(&archive, &"0".repeat(2048)).unwrap(),
            None => std::fs::write(archive, vec![0u8; 2048]).unwrap(),
        }
        Ok(CommandOutput::default())
    }
}

/// Answers prompts from a fixed script; an exhausted script means stop.
pub struct ScriptedPrompter {
    answers: VecDeque<&'static str>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&'static str]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(
        &mut self,
        _entry: &StatusEntry,
        _position: usize,
        _total: usize,
    ) -> anyhow::Result<Decision> {
        Ok(self
            .answers
            .pop_front()
            .map(Decision::parse)
            .unwrap_or(Decision::Abort))
    }

    fn continue_after_failure(
        &mut self,
        _entry: &StatusEntry,
        _error: &str,
    ) -> anyhow::Result<bool> {
        Ok(self
            .answers
            .pop_front()
            .is_some_and(|a| Decision::parse(a) == Decision::Proceed))
    }
}

/// Proceeds for the first `answers` prompts, then fails to read input.
pub struct BrokenPrompter {
    answers: usize,
}

impl BrokenPrompter {
    pub fn after(answers: usize) -> Self {
        Self { answers }
    }
}

impl Prompter for BrokenPrompter {
    fn confirm(
        &mut self,
        _entry: &StatusEntry,
        _position: usize,
        _total: usize,
    ) -> anyhow::Result<Decision> {
        if self.answers == 0 {
            anyhow::bail!("stdin closed unexpectedly");
        }
        self.answers -= 1;
        Ok(Decision::Proceed)
    }

    fn continue_after_failure(
        &mut self,
        _entry: &StatusEntry,
        _error: &str,
    ) -> anyhow::Result<bool> {
        anyhow::bail!("stdin closed unexpectedly")
    }
}
