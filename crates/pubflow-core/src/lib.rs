//! Pubflow Core Library
//!
//! Publication workflow for multi-package JavaScript monorepos: scan the
//! package manifests, classify each package against the registry, record the
//! result, then build and publish whatever is missing. Also provides the
//! workspace maintenance operations (scope rename, protocol conversion,
//! linking, packing).

pub mod artifact;
pub mod commands;
pub mod config;
pub mod context;
pub mod fs;
pub mod publish;
pub mod registry;
pub mod runner;
pub mod types;
pub mod workspace;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{CheckMode, ConfigStore, PubflowConfig, RegistryBackend};

    // Context
    pub use crate::context::WorkspaceContext;

    // Artifacts
    pub use crate::artifact::{
        PublicationOutcome, PublicationState, PublicationStatus, StatusArtifact, StatusEntry,
    };

    // Seams
    pub use crate::fs::{FileStore, MemoryFileStore, OsFileStore};
    pub use crate::publish::{Decision, LinePrompter, Prompter};
    pub use crate::registry::{RegistryQuery, RegistryRecord};
    pub use crate::runner::{CommandRunner, ProcessRunner};

    // Types
    pub use crate::types::{PackageDescriptor, PackageRef};
}
