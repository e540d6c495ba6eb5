//! Shared core types used across the scanner, checker and publisher.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One local publishable package, as read from its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Registry-qualified name, e.g. `@scope/checkbox`.
    pub name: String,
    /// Version declared in the manifest.
    pub local_version: String,
    /// Directory relative to the packages directory.
    pub directory: PathBuf,
}

impl PackageDescriptor {
    pub fn new(
        name: impl Into<String>,
        local_version: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            local_version: local_version.into(),
            directory: directory.into(),
        }
    }

    pub fn package_ref(&self) -> PackageRef {
        PackageRef {
            name: self.name.clone(),
            version: self.local_version.clone(),
        }
    }
}

/// Name/version reference used in publication outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
