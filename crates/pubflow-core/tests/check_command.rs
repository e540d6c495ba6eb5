mod support;

use pubflow_core::artifact::{PublicationState, PublicationStatus, StatusRecorder};
use pubflow_core::commands::{CheckCommand, CheckOptions};
use pubflow_core::config::CheckMode;
use pubflow_core::fs::OsFileStore;
use serde_json::json;
use tempfile::TempDir;

use support::{FakeRegistry, context, read_json, write_package, write_raw};

fn seed(root: &std::path::Path) {
    write_package(root, "checkbox", json!({ "name": "@acme/checkbox", "version": "1.1.0" }));
    write_package(root, "slot", json!({ "name": "@acme/slot", "version": "1.0.0" }));
    write_package(root, "toggle", json!({ "name": "@acme/toggle", "version": "0.1.0" }));
    write_package(root, "tooltip", json!({ "name": "@acme/tooltip", "version": "2.0.0" }));
}

fn registry() -> FakeRegistry {
    FakeRegistry::new()
        .with("@acme/checkbox", &["1.0.0"])
        .with("@acme/slot", &["0.9.0", "1.0.0"])
        .failing("@acme/tooltip")
}

#[test]
fn check_writes_partitioned_artifact() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let ctx = context(temp.path());
    let registry = registry();

    let report = CheckCommand::new(&ctx, &registry)
        .execute(&CheckOptions::new())
        .unwrap();

    assert_eq!(report.mode, CheckMode::ExactVersion);
    assert_eq!(report.path, temp.path().join("scripts/npm-status.json"));
    assert_eq!(
        registry.lookups(),
        vec!["@acme/checkbox", "@acme/slot", "@acme/toggle", "@acme/tooltip"]
    );

    let json = read_json(&report.path);
    assert_eq!(json["published"].as_array().unwrap().len(), 1);
    assert_eq!(json["published"][0]["name"], "@acme/slot");
    let unpublished: Vec<_> = json["unpublished"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["name"].as_str().unwrap(), e["state"].as_str().unwrap()))
        .collect();
    assert_eq!(
        unpublished,
        vec![
            ("@acme/checkbox", "Unpublished"),
            ("@acme/toggle", "Unpublished"),
            ("@acme/tooltip", "Unknown"),
        ]
    );
    assert_eq!(json["unpublished"][0]["registryVersion"], "1.0.0");
    assert_eq!(json["unpublished"][1]["registryVersion"], "none");
    assert!(json["unpublished"][2]["error"].is_string());
    assert!(json["timestamp"].is_string());
    assert_eq!(report.unknown_count(), 1);
}

#[test]
fn name_mode_counts_any_release_as_published() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let ctx = context(temp.path());
    let registry = registry();

    let report = CheckCommand::new(&ctx, &registry)
        .execute(&CheckOptions::new().with_mode(CheckMode::Name))
        .unwrap();

    let published: Vec<_> = report
        .artifact
        .published
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(published, vec!["@acme/checkbox", "@acme/slot"]);
}

#[test]
fn repeated_checks_match_except_timestamp() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let ctx = context(temp.path());
    let registry = registry();
    let command = CheckCommand::new(&ctx, &registry);

    let first = command.execute(&CheckOptions::new()).unwrap().artifact;
    let second = command.execute(&CheckOptions::new()).unwrap().artifact;

    assert_eq!(first.published, second.published);
    assert_eq!(first.unpublished, second.unpublished);
}

#[test]
fn check_replaces_previous_artifact() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    write_raw(
        temp.path(),
        "scripts/npm-status.json",
        r#"{"published":[],"unpublished":[{"name":"@acme/gone","dir":"gone","localVersion":"1.0.0"}],"timestamp":"2020-01-01T00:00:00Z"}"#,
    );
    let ctx = context(temp.path());

    CheckCommand::new(&ctx, &registry())
        .execute(&CheckOptions::new())
        .unwrap();

    let artifact = StatusRecorder::new(&OsFileStore, temp.path().join("scripts/npm-status.json"))
        .load()
        .unwrap();
    assert!(artifact.unpublished.iter().all(|e| e.name != "@acme/gone"));
    assert_eq!(artifact.total(), 4);
}

#[test]
fn unknown_entries_carry_error_only() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    let ctx = context(temp.path());

    let report = CheckCommand::new(&ctx, &registry())
        .execute(&CheckOptions::new())
        .unwrap();

    for entry in report
        .artifact
        .published
        .iter()
        .chain(&report.artifact.unpublished)
    {
        let unknown = entry.status.state() == PublicationState::Unknown;
        assert_eq!(entry.status.error().is_some(), unknown);
        assert_eq!(entry.status.registry_version().is_none(), unknown);
    }
    let tooltip = report
        .artifact
        .unknown()
        .next()
        .unwrap();
    assert!(matches!(tooltip.status, PublicationStatus::Unknown { .. }));
}

#[test]
fn persist_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    seed(temp.path());
    // a directory where the artifact file should go
    std::fs::create_dir_all(temp.path().join("scripts/npm-status.json")).unwrap();
    let ctx = context(temp.path());

    let err = CheckCommand::new(&ctx, &registry())
        .execute(&CheckOptions::new())
        .unwrap_err();

    assert!(err.to_string().contains("Failed to persist status artifact"));
}

#[test]
fn missing_packages_directory_fails() {
    let temp = TempDir::new().unwrap();
    let ctx = context(temp.path());

    let result = CheckCommand::new(&ctx, &FakeRegistry::new()).execute(&CheckOptions::new());

    assert!(result.is_err());
}
