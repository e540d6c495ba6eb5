//! Config store for loading and saving pubflow.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{PubflowConfig, parser};

pub const CONFIG_FILE_NAME: &str = "pubflow.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store for `<root>/pubflow.toml`.
    pub fn for_root(root: &Path) -> Self {
        Self {
            config_path: root.join(CONFIG_FILE_NAME),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config, falling back to defaults when the file is absent.
    pub fn load(&self) -> anyhow::Result<PubflowConfig> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(PubflowConfig::new());
        }
        parser::parse_pubflow_toml(&self.config_path)
    }

    pub fn save(&self, config: &PubflowConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}
