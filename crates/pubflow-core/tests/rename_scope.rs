mod support;

use pubflow_core::commands::{RenameOptions, RenameScopeCommand};
use pubflow_core::config::RepositoryInfo;
use serde_json::json;
use tempfile::TempDir;

use support::{context, context_with, fast_config, read_json, write_package, write_raw};

fn seed(root: &std::path::Path) {
    write_raw(
        root,
        "package.json",
        "{\n  \"name\": \"@rn-primitives/monorepo\",\n  \"private\": true,\n  \"devDependencies\": {\n    \"@rn-primitives/types\": \"workspace:*\",\n    \"typescript\": \"^5.0.0\"\n  }\n}\n",
    );
    write_package(
        root,
        "checkbox",
        json!({
            "name": "@rn-primitives/checkbox",
            "version": "1.0.0",
            "dependencies": {
                "@rn-primitives/slot": "workspace:*",
                "clsx": "^2.0.0",
                "@rn-primitives/types": "^1.0.0"
            },
            "peerDependencies": { "@rn-primitives/hooks": "*", "react": ">=18" }
        }),
    );
    write_package(
        root,
        "slot",
        json!({ "name": "@rn-primitives/slot", "version": "1.0.0", "publishConfig": { "access": "restricted" } }),
    );
    write_raw(root, "README.md", "npm i @rn-primitives/checkbox\n");
}

#[test]
fn rename_moves_keys_and_keeps_values() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let before = read_json(&temp.path().join("packages/checkbox/package.json"));
    let ctx = context(temp.path());

    let report = RenameScopeCommand::new(&ctx)
        .execute(&RenameOptions::new("@acme"))
        .unwrap();

    assert!(report.verified());
    assert_eq!(report.manifests.len(), 3);
    assert_eq!(report.text_files, vec![std::path::PathBuf::from("README.md")]);

    let after = read_json(&temp.path().join("packages/checkbox/package.json"));
    assert_eq!(after["name"], "@acme/checkbox");
    for table in ["dependencies", "peerDependencies"] {
        let old: Vec<_> = before[table].as_object().unwrap().iter().collect();
        let new: Vec<_> = after[table].as_object().unwrap().iter().collect();
        assert_eq!(old.len(), new.len());
        for ((old_key, old_value), (new_key, new_value)) in old.into_iter().zip(new) {
            assert_eq!(old_value, new_value);
            assert!(!new_key.starts_with("@rn-primitives/"));
            assert_eq!(
                new_key.as_str(),
                old_key.replacen("@rn-primitives/", "@acme/", 1)
            );
        }
    }
    assert_eq!(after["publishConfig"]["access"], "public");

    let slot = read_json(&temp.path().join("packages/slot/package.json"));
    assert_eq!(slot["publishConfig"]["access"], "restricted");

    let root = read_json(&temp.path().join("package.json"));
    assert_eq!(root["devDependencies"]["@acme/types"], "workspace:*");
    assert_eq!(
        std::fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "npm i @acme/checkbox\n"
    );
}

#[test]
fn rename_keeps_two_space_format_and_trailing_newline() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let ctx = context(temp.path());

    RenameScopeCommand::new(&ctx)
        .execute(&RenameOptions::new("@acme"))
        .unwrap();

    let content = std::fs::read_to_string(temp.path().join("package.json")).unwrap();
    assert!(content.starts_with("{\n  \"name\": \"@acme/monorepo\",\n  \"private\": true,"));
    assert!(content.ends_with("}\n"));
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let manifest = temp.path().join("packages/checkbox/package.json");
    let before = std::fs::read_to_string(&manifest).unwrap();
    let ctx = context(temp.path());

    let report = RenameScopeCommand::new(&ctx)
        .execute(&RenameOptions::new("@acme").with_dry_run(true))
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.manifests.len(), 3);
    assert_eq!(std::fs::read_to_string(&manifest).unwrap(), before);
    assert_eq!(
        std::fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "npm i @rn-primitives/checkbox\n"
    );
}

#[test]
fn configured_metadata_is_applied() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let mut config = fast_config();
    config.rename.repository = Some(RepositoryInfo {
        kind: "git".to_string(),
        url: "https://example.com/acme/ui.git".to_string(),
    });
    config.rename.license = Some("MIT".to_string());
    let ctx = context_with(temp.path(), config);

    RenameScopeCommand::new(&ctx)
        .execute(&RenameOptions::new("@acme"))
        .unwrap();

    let checkbox = read_json(&temp.path().join("packages/checkbox/package.json"));
    assert_eq!(
        checkbox["repository"],
        json!({
            "type": "git",
            "url": "https://example.com/acme/ui.git",
            "directory": "packages/checkbox"
        })
    );
    assert_eq!(checkbox["license"], "MIT");
    let root = read_json(&temp.path().join("package.json"));
    assert!(root["repository"].get("directory").is_none());
}

#[test]
fn explicit_source_scope_overrides_config() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), "a", json!({ "name": "@acme/a", "version": "1.0.0" }));
    let ctx = context(temp.path());

    let report = RenameScopeCommand::new(&ctx)
        .execute(&RenameOptions::new("@globex").with_from("@acme"))
        .unwrap();

    assert_eq!(report.from, "@acme");
    let a = read_json(&temp.path().join("packages/a/package.json"));
    assert_eq!(a["name"], "@globex/a");
}

#[test]
fn invalid_scope_is_rejected() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let ctx = context(temp.path());

    assert!(
        RenameScopeCommand::new(&ctx)
            .execute(&RenameOptions::new("acme"))
            .is_err()
    );
    assert!(
        RenameScopeCommand::new(&ctx)
            .execute(&RenameOptions::new("@rn-primitives"))
            .is_err()
    );
}

#[test]
fn unreadable_manifest_is_reported_as_leftover() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    write_raw(
        temp.path(),
        "packages/broken/package.json",
        "{ \"name\": \"@rn-primitives/broken\",",
    );
    let ctx = context(temp.path());

    let report = RenameScopeCommand::new(&ctx)
        .execute(&RenameOptions::new("@acme"))
        .unwrap();

    assert_eq!(report.skipped, vec!["broken"]);
    assert_eq!(report.leftovers, vec!["broken"]);
    assert!(!report.verified());
}
