//! `workspace:*` to `*` conversion for registry-compatible manifests.

use serde_json::{Map, Value};

use super::manifest::DEPENDENCY_TABLES;

pub const WORKSPACE_PROTOCOL: &str = "workspace:*";

/// Replace `workspace:*` dependency values with `*`. Returns the number of
/// values changed.
pub fn convert_workspace_protocol(fields: &mut Map<String, Value>) -> usize {
    let mut converted = 0;
    for table in DEPENDENCY_TABLES {
        let Some(Value::Object(deps)) = fields.get_mut(table) else {
            continue;
        };
        for value in deps.values_mut() {
            if value.as_str() == Some(WORKSPACE_PROTOCOL) {
                *value = Value::String("*".to_string());
                converted += 1;
            }
        }
    }
    converted
}
