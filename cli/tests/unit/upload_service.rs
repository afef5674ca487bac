//! Unit tests for artifact validation and the upload orchestrator.

#![allow(clippy::expect_used)]

use std::path::Path;

use agent_metadata_cli::application::services::upload::{upload_artifacts, validate_artifacts};
use agent_metadata_common::has_failures;

use crate::mocks::{FakeFiles, RecordingRegistry, artifact, manifest_digest_for};

#[test]
fn validation_collects_every_failure() {
    let files = FakeFiles::with_missing(&["dist/mac.tar.gz"]);
    let mut traversal = artifact("win", "windows", "amd64");
    traversal.path = "../outside/agent.zip".to_string();
    let artifacts = vec![
        artifact("linux", "linux", "amd64"),
        artifact("mac", "darwin", "arm64"),
        traversal,
    ];

    let failures = validate_artifacts(&files, &artifacts, Path::new("/work"))
        .expect_err("two artifacts are invalid");

    assert_eq!(failures.len(), 2);
    assert!(failures[0].starts_with("mac: binary not found"));
    assert!(failures[1].starts_with("win: path '../outside/agent.zip' contains a '..' segment"));
}

#[test]
fn validation_returns_resolved_paths_in_order() {
    let files = FakeFiles::default();
    let artifacts = vec![artifact("a", "linux", "amd64"), artifact("b", "linux", "arm64")];

    let paths = validate_artifacts(&files, &artifacts, Path::new("/work")).expect("valid");

    assert_eq!(
        paths,
        vec![
            Path::new("/work/dist/a.tar.gz").to_path_buf(),
            Path::new("/work/dist/b.tar.gz").to_path_buf()
        ]
    );
}

#[tokio::test]
async fn uploads_every_artifact_in_declaration_order() {
    let files = FakeFiles::default();
    let registry = RecordingRegistry::default();
    let artifacts = vec![
        artifact("linux-amd64", "linux", "amd64"),
        artifact("linux-arm64", "linux", "arm64"),
        artifact("darwin-arm64", "darwin", "arm64"),
    ];

    let results = upload_artifacts(&registry, &files, &artifacts, Path::new("/work"), "1.2.3").await;

    assert_eq!(results.len(), 3);
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["linux-amd64", "linux-arm64", "darwin-arm64"]);
    assert_eq!(registry.uploaded_names(), names);
    assert!(!has_failures(&results));

    let first = &results[0];
    assert!(first.uploaded);
    assert!(first.error.is_empty());
    assert_eq!(first.digest, manifest_digest_for("linux-amd64").to_string());
    assert_eq!(first.tag, "1.2.3");
}

#[tokio::test]
async fn failures_are_recorded_without_aborting_the_batch() {
    let files = FakeFiles::with_missing(&["dist/b.tar.gz"]);
    let registry = RecordingRegistry::failing(&["c"]);
    let artifacts = vec![
        artifact("a", "linux", "amd64"),
        artifact("b", "linux", "arm64"),
        artifact("c", "darwin", "arm64"),
        artifact("d", "windows", "amd64"),
    ];

    let results = upload_artifacts(&registry, &files, &artifacts, Path::new("/work"), "1.0.0").await;

    assert_eq!(results.len(), 4);
    assert!(has_failures(&results));
    assert!(results[0].uploaded);
    assert!(!results[1].uploaded);
    assert!(results[1].error.contains("binary not found"));
    assert!(results[1].digest.is_empty());
    assert!(!results[2].uploaded);
    assert!(results[2].error.contains("HTTP 500"));
    assert!(results[3].uploaded);

    // The missing artifact never reached the registry.
    assert_eq!(registry.uploaded_names(), ["a", "c", "d"]);
}

#[tokio::test]
async fn empty_batch_yields_no_results() {
    let results = upload_artifacts(
        &RecordingRegistry::default(),
        &FakeFiles::default(),
        &[],
        Path::new("/work"),
        "1.0.0",
    )
    .await;
    assert!(results.is_empty());
    assert!(!has_failures(&results));
}
