//! High-level commands for pubflow operations.
//!
//! Each command is synchronous and owns its async runtime, so frontends can
//! call them directly. External seams (registry, command runner, prompter)
//! are passed in by the caller.

pub mod check;
pub mod list;
pub mod publish;
pub mod rename;
pub mod scaffold;
pub mod tasks;
pub mod verify;

pub use check::{CheckCommand, CheckOptions, CheckReport};
pub use list::{ListCommand, ListReport, ListedPackage};
pub use publish::{PublishCommand, PublishReport};
pub use rename::{RenameOptions, RenameReport, RenameScopeCommand};
pub use scaffold::{CreateCommand, CreateReport, DeleteCommand, DeleteTarget};
pub use tasks::{
    ConvertProtocolCommand, ConvertReport, LinkCommand, PackCommand, PackReport, PackedArchive,
    TaskReport,
};
pub use verify::{BUILD_OUTPUT_DIR, VerifyCommand, VerifyReport};
