//! Workspace configuration
//!
//! Settings live in an optional `pubflow.toml` at the workspace root. Every
//! stage receives the loaded [`PubflowConfig`] explicitly instead of reading
//! module-level constants.

pub mod parser;
pub mod schema;
pub mod store;

pub use parser::{parse_pubflow_toml, parse_pubflow_toml_str, to_toml};
pub use schema::{
    CheckMode, CommandSettings, DEFAULT_REGISTRY_URL, PublishSettings, PubflowConfig,
    RegistryBackend, RegistrySettings, RenameSettings, RepositoryInfo, ScaffoldSettings,
};
pub use store::{CONFIG_FILE_NAME, ConfigStore};
