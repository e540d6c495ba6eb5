//! Configuration schema for `pubflow.toml`.
//!
//! Every field has a default matching the conventional monorepo layout, so
//! an absent file (or an empty one) is a valid configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Root configuration passed to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PubflowConfig {
    /// Directory holding one subdirectory per package, relative to the root.
    pub packages_dir: PathBuf,
    /// Status artifact written by `check` and read by `publish`.
    pub status_file: PathBuf,
    /// Results artifact of a batch publish run.
    pub results_file: PathBuf,
    /// Results artifact of an interactive publish run.
    pub interactive_results_file: PathBuf,
    /// Package name prefixes the scanner ignores (e.g. the monorepo root).
    pub exclude: Vec<String>,
    /// Directory names listed as shared packages rather than primitives.
    pub shared_packages: Vec<String>,
    pub registry: RegistrySettings,
    pub commands: CommandSettings,
    pub publish: PublishSettings,
    pub rename: RenameSettings,
    pub scaffold: ScaffoldSettings,
}

impl Default for PubflowConfig {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("packages"),
            status_file: PathBuf::from("scripts/npm-status.json"),
            results_file: PathBuf::from("scripts/publish-results.json"),
            interactive_results_file: PathBuf::from("scripts/publish-interactive-results.json"),
            exclude: vec!["@dino-rn-primitives/monorepo".to_string()],
            shared_packages: ["hooks", "portal", "slot", "types", "utils"]
                .into_iter()
                .map(String::from)
                .collect(),
            registry: RegistrySettings::default(),
            commands: CommandSettings::default(),
            publish: PublishSettings::default(),
            rename: RenameSettings::default(),
            scaffold: ScaffoldSettings::default(),
        }
    }
}

impl PubflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate invariants serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.registry.base_url()?;

        let commands = [
            ("commands.build", &self.commands.build),
            ("commands.publish", &self.commands.publish),
            ("commands.query", &self.commands.query),
            ("commands.link", &self.commands.link),
            ("commands.pack", &self.commands.pack),
        ];
        for (key, argv) in commands {
            if argv.is_empty() || argv[0].trim().is_empty() {
                anyhow::bail!("{} must name a program", key);
            }
        }

        if self.commands.timeout_secs == 0 {
            anyhow::bail!("commands.timeout_secs must be greater than zero");
        }

        if !self.rename.from_scope.starts_with('@') {
            anyhow::bail!(
                "rename.from_scope must start with '@', got '{}'",
                self.rename.from_scope
            );
        }
        if !self.scaffold.scope.starts_with('@') {
            anyhow::bail!(
                "scaffold.scope must start with '@', got '{}'",
                self.scaffold.scope
            );
        }
        semver::Version::parse(&self.scaffold.version).map_err(|e| {
            anyhow::anyhow!("Invalid scaffold.version '{}': {}", self.scaffold.version, e)
        })?;

        Ok(())
    }
}

/// Which registry transport the checker uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryBackend {
    /// Query the registry's HTTP document endpoint.
    #[default]
    Http,
    /// Shell out to the package manager's `view` command.
    Cli,
}

/// What counts as "already published".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckMode {
    /// The package name exists in the registry.
    Name,
    /// The exact local `name@version` exists in the registry.
    #[default]
    ExactVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrySettings {
    pub url: String,
    pub backend: RegistryBackend,
    pub check_mode: CheckMode,
    /// Pause between consecutive registry queries.
    pub query_delay_ms: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            backend: RegistryBackend::default(),
            check_mode: CheckMode::default(),
            query_delay_ms: 100,
        }
    }
}

impl RegistrySettings {
    /// Parsed registry URL; only http(s) is accepted.
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| anyhow::anyhow!("Invalid registry.url '{}': {}", self.url, e))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => anyhow::bail!("registry.url must use http or https, got '{}://'", other),
        }
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }
}

/// External commands, each an argv vector run inside a package directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandSettings {
    pub build: Vec<String>,
    pub publish: Vec<String>,
    /// Registry lookup prefix; `<name>[@<version>] version` is appended.
    pub query: Vec<String>,
    pub link: Vec<String>,
    /// Pack prefix; `--pack-destination <dir>` is appended.
    pub pack: Vec<String>,
    /// Upper bound for any single external command.
    pub timeout_secs: u64,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            build: argv(&["pnpm", "build"]),
            publish: argv(&["pnpm", "pub:release"]),
            query: argv(&["npm", "view"]),
            link: argv(&["pnpm", "link", "--global"]),
            pack: argv(&["pnpm", "pack"]),
            timeout_secs: 600,
        }
    }
}

impl CommandSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishSettings {
    /// Pause between successive publishes in batch mode.
    pub delay_secs: u64,
    /// Output directory for `pack`, relative to the root.
    pub pack_dir: PathBuf,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            delay_secs: 2,
            pack_dir: PathBuf::from("packed-packages"),
        }
    }
}

impl PublishSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Settings for `rename-scope`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenameSettings {
    /// Scope currently used by the workspace.
    pub from_scope: String,
    /// Repository written into every manifest; packages also get `directory`.
    pub repository: Option<RepositoryInfo>,
    pub author: Option<String>,
    pub license: Option<String>,
    /// Text files (relative to the root) where the scope is replaced verbatim.
    pub text_files: Vec<PathBuf>,
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self {
            from_scope: "@rn-primitives".to_string(),
            repository: None,
            author: None,
            license: None,
            text_files: ["README.md", "docs/NPM_INSTALLATION.md", "docs/QUICK_START.md"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

/// Settings for `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaffoldSettings {
    /// Scope of newly created packages.
    pub scope: String,
    pub version: String,
    pub license: String,
    /// Workspace packages every new package depends on.
    pub dependencies: Vec<String>,
}

impl Default for ScaffoldSettings {
    fn default() -> Self {
        Self {
            scope: "@dino-rn-primitives".to_string(),
            version: "0.0.1".to_string(),
            license: "MIT".to_string(),
            dependencies: argv(&["hooks", "slot", "types"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryInfo {
    #[serde(rename = "type", default = "default_repository_type")]
    pub kind: String,
    pub url: String,
}

fn default_repository_type() -> String {
    "git".to_string()
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
