//! Scope rename for manifests and plain-text files.

use std::collections::HashSet;

use anyhow::bail;
use serde_json::{Map, Value, json};

use super::manifest::DEPENDENCY_TABLES;
use crate::config::RenameSettings;

/// Validate a scope given on the command line.
pub fn validate_scope(scope: &str) -> anyhow::Result<()> {
    if !scope.starts_with('@') || scope.len() < 2 || scope.contains('/') {
        bail!("Scope must start with @ and contain no '/': '{}'", scope);
    }
    Ok(())
}

/// `@old/pkg` becomes `@new/pkg`; other names are left alone.
pub fn rename_in_name(name: &str, from: &str, to: &str) -> Option<String> {
    if name == from {
        return Some(to.to_string());
    }
    name.strip_prefix(from)
        .filter(|rest| rest.starts_with('/'))
        .map(|rest| format!("{}{}", to, rest))
}

/// Rewrite `name` and dependency keys of one manifest. Returns whether the
/// scope appeared anywhere.
///
/// Renamed keys keep their position and value. When the new name is already
/// present in the same table, the renamed entry replaces it.
pub fn rename_manifest_scope(fields: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    let mut changed = false;

    if let Some(Value::String(name)) = fields.get_mut("name")
        && let Some(renamed) = rename_in_name(name, from, to)
    {
        *name = renamed;
        changed = true;
    }

    for table in DEPENDENCY_TABLES {
        let Some(Value::Object(deps)) = fields.get_mut(table) else {
            continue;
        };
        let targets: HashSet<String> = deps
            .keys()
            .filter_map(|key| rename_in_name(key, from, to))
            .collect();
        if targets.is_empty() {
            continue;
        }

        let mut renamed = Map::with_capacity(deps.len());
        for (key, value) in std::mem::take(deps) {
            match rename_in_name(&key, from, to) {
                Some(new_key) => {
                    renamed.insert(new_key, value);
                }
                None if targets.contains(&key) => {
                    tracing::warn!(table, key = %key, "replaced by renamed dependency");
                }
                None => {
                    renamed.insert(key, value);
                }
            }
        }
        *deps = renamed;
        changed = true;
    }

    changed
}

/// Apply the configured repository, author, license and public access.
///
/// `package_dir` is set for packages under the packages directory and adds
/// `repository.directory`.
pub fn apply_metadata(
    fields: &mut Map<String, Value>,
    settings: &RenameSettings,
    package_dir: Option<&str>,
) {
    if let Some(repository) = &settings.repository {
        let mut value = json!({
            "type": repository.kind,
            "url": repository.url,
        });
        if let (Some(dir), Some(object)) = (package_dir, value.as_object_mut()) {
            object.insert("directory".to_string(), json!(format!("packages/{}", dir)));
        }
        fields.insert("repository".to_string(), value);
    }
    if let Some(author) = &settings.author {
        fields.insert("author".to_string(), json!(author));
    }
    if let Some(license) = &settings.license {
        fields.insert("license".to_string(), json!(license));
    }
    if !fields.contains_key("publishConfig") {
        fields.insert("publishConfig".to_string(), json!({ "access": "public" }));
    }
}

/// Replace every occurrence of `from` in a text file's content.
pub fn replace_scope_in_text(content: &str, from: &str, to: &str) -> Option<String> {
    content
        .contains(from)
        .then(|| content.replace(from, to))
}
