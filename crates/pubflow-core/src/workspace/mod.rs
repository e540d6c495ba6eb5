//! Monorepo workspace model
//!
//! Package manifests under the packages directory, the inventory scanner and
//! the manifest rewrites used by maintenance commands.

pub mod manifest;
pub mod protocol;
pub mod rename;
pub mod scaffold;
pub mod scanner;

pub use manifest::{DEPENDENCY_TABLES, MANIFEST_FILE, Manifest, ManifestError};
pub use protocol::{WORKSPACE_PROTOCOL, convert_workspace_protocol};
pub use rename::{
    apply_metadata, rename_in_name, rename_manifest_scope, replace_scope_in_text, validate_scope,
};
pub use scaffold::validate_package_name;
pub use scanner::Scanner;
