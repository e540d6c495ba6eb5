mod support;

use pubflow_core::commands::{CreateCommand, DeleteCommand};
use serde_json::json;
use tempfile::TempDir;

use support::{context, read_json, write_package};

#[test]
fn create_writes_manifest_and_support_files() {
    let temp = TempDir::new().unwrap();
    let ctx = context(temp.path());

    let report = CreateCommand::new(&ctx).execute("alert-dialog").unwrap();

    let dir = temp.path().join("packages/alert-dialog");
    assert_eq!(report.dir, dir);
    assert_eq!(report.name, "@dino-rn-primitives/alert-dialog");
    assert!(dir.join("src").is_dir());
    assert!(dir.join("tsconfig.json").is_file());
    assert!(dir.join("CHANGELOG.md").is_file());

    let manifest = read_json(&dir.join("package.json"));
    assert_eq!(manifest["version"], "0.0.1");
    assert_eq!(
        manifest["dependencies"]["@dino-rn-primitives/types"],
        "workspace:*"
    );
    let raw = std::fs::read_to_string(dir.join("package.json")).unwrap();
    assert!(raw.starts_with("{\n  \"name\""));
    assert!(raw.ends_with("}\n"));
}

#[test]
fn create_rejects_bad_names() {
    let temp = TempDir::new().unwrap();
    let ctx = context(temp.path());

    let err = CreateCommand::new(&ctx).execute("AlertDialog").unwrap_err();

    assert!(err.to_string().contains("lowercase"));
    assert!(!temp.path().join("packages").exists());
}

#[test]
fn create_refuses_existing_directory() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), "button", json!({ "name": "@acme/button", "version": "2.0.0" }));
    let ctx = context(temp.path());

    let err = CreateCommand::new(&ctx).execute("button").unwrap_err();

    assert!(err.to_string().contains("already exists"));
    let manifest = read_json(&temp.path().join("packages/button/package.json"));
    assert_eq!(manifest["version"], "2.0.0");
}

#[test]
fn delete_shows_manifest_then_removes_directory() {
    let temp = TempDir::new().unwrap();
    write_package(
        temp.path(),
        "toggle",
        json!({ "name": "@acme/toggle", "version": "1.1.0", "description": "Toggle primitive" }),
    );
    std::fs::create_dir_all(temp.path().join("packages/toggle/dist")).unwrap();
    let ctx = context(temp.path());
    let command = DeleteCommand::new(&ctx);

    let target = command.inspect("toggle").unwrap();
    assert_eq!(target.name.as_deref(), Some("@acme/toggle"));
    assert_eq!(target.version.as_deref(), Some("1.1.0"));
    assert_eq!(target.description.as_deref(), Some("Toggle primitive"));
    assert!(temp.path().join("packages/toggle").exists());

    command.execute(&target).unwrap();

    assert!(!temp.path().join("packages/toggle").exists());
    assert!(temp.path().join("packages").exists());
}

#[test]
fn delete_tolerates_missing_manifest() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("packages/empty")).unwrap();
    let ctx = context(temp.path());

    let target = DeleteCommand::new(&ctx).inspect("empty").unwrap();

    assert_eq!(target.name, None);
    assert_eq!(target.version, None);
}

#[test]
fn delete_rejects_unknown_or_escaping_directories() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("packages")).unwrap();
    let ctx = context(temp.path());
    let command = DeleteCommand::new(&ctx);

    assert!(command.inspect("missing").unwrap_err().to_string().contains("does not exist"));
    assert!(command.inspect("..").is_err());
    assert!(command.inspect("../packages").is_err());
}
