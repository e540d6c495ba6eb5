//! `package.json` access.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::fs::FileStore;

pub const MANIFEST_FILE: &str = "package.json";

/// Dependency tables rewritten by the scope and protocol operations.
pub const DEPENDENCY_TABLES: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("{} has no string `{field}` field", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{} declares invalid version '{version}': {source}", .path.display())]
    InvalidVersion {
        path: PathBuf,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A parsed manifest. Key order is kept as read.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }

    pub fn read(store: &dyn FileStore, path: impl Into<PathBuf>) -> Result<Self, ManifestError> {
        let path = path.into();
        let content = store
            .read_to_string(&path)
            .map_err(|source| ManifestError::Read {
                path: path.clone(),
                source,
            })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self, ManifestError> {
        let path = path.into();
        let value: Value = serde_json::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.clone(),
            source,
        })?;
        match value {
            Value::Object(fields) => Ok(Self { path, fields }),
            _ => Err(ManifestError::NotAnObject { path }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    fn string_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.string_field("name")
    }

    pub fn version(&self) -> Option<&str> {
        self.string_field("version")
    }

    pub fn description(&self) -> Option<&str> {
        self.string_field("description")
    }

    /// Name and semver-valid version, or the reason they are unusable.
    pub fn identity(&self) -> Result<(&str, &str), ManifestError> {
        let name = self.name().ok_or_else(|| ManifestError::MissingField {
            path: self.path.clone(),
            field: "name",
        })?;
        let version = self.version().ok_or_else(|| ManifestError::MissingField {
            path: self.path.clone(),
            field: "version",
        })?;
        semver::Version::parse(version).map_err(|source| ManifestError::InvalidVersion {
            path: self.path.clone(),
            version: version.to_string(),
            source,
        })?;
        Ok((name, version))
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(&self.fields)?;
        json.push('\n');
        Ok(json)
    }

    pub fn save(&self, store: &dyn FileStore) -> Result<(), ManifestError> {
        let json = self.to_json().map_err(|source| ManifestError::Parse {
            path: self.path.clone(),
            source,
        })?;
        store
            .write_atomic(&self.path, &json)
            .map_err(|source| ManifestError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileStore;

    #[test]
    fn identity_requires_name_and_semver_version() {
        let ok = Manifest::parse("p.json", r#"{"name":"@acme/a","version":"1.2.3-beta.1"}"#)
            .unwrap();
        assert_eq!(ok.identity().unwrap(), ("@acme/a", "1.2.3-beta.1"));

        let no_version = Manifest::parse("p.json", r#"{"name":"@acme/a"}"#).unwrap();
        assert!(matches!(
            no_version.identity(),
            Err(ManifestError::MissingField { field: "version", .. })
        ));

        let numeric = Manifest::parse("p.json", r#"{"name":"@acme/a","version":1}"#).unwrap();
        assert!(numeric.identity().is_err());

        let loose = Manifest::parse("p.json", r#"{"name":"@acme/a","version":"1.0"}"#).unwrap();
        assert!(matches!(
            loose.identity(),
            Err(ManifestError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(matches!(
            Manifest::parse("p.json", "[1, 2]"),
            Err(ManifestError::NotAnObject { .. })
        ));
    }

    #[test]
    fn save_keeps_key_order_and_formatting() {
        let content = "{\n  \"version\": \"1.0.0\",\n  \"name\": \"@acme/a\",\n  \"private\": false\n}\n";
        let store = MemoryFileStore::new().with_file("/ws/packages/a/package.json", content);

        let manifest = Manifest::read(&store, "/ws/packages/a/package.json").unwrap();
        manifest.save(&store).unwrap();

        assert_eq!(
            store.get(Path::new("/ws/packages/a/package.json")).unwrap(),
            content
        );
    }
}
