//! Unit tests for manifest index creation.

#![allow(clippy::expect_used)]

use agent_metadata_cli::application::services::index::create_manifest_index;
use agent_metadata_cli::domain::IndexError;
use agent_metadata_cli::domain::digest::sha256_digest;
use agent_metadata_common::oci::{ANNOTATION_VERSION, MEDIA_TYPE_IMAGE_INDEX};
use agent_metadata_common::{ArtifactUploadResult, ImageIndex};

use crate::mocks::{RecordingRegistry, artifact, manifest_digest_for};

fn uploaded(name: &str, os: &str, arch: &str) -> ArtifactUploadResult {
    ArtifactUploadResult::uploaded(&artifact(name, os, arch), &manifest_digest_for(name), 512, "2.1.0")
}

#[tokio::test]
async fn pushes_index_tagged_with_version_and_returns_its_digest() {
    let registry = RecordingRegistry::default();
    let results = vec![uploaded("linux", "linux", "amd64"), uploaded("mac", "darwin", "arm64")];

    let digest = create_manifest_index(&registry, &results, "2.1.0")
        .await
        .expect("index pushed");

    let pushes = registry.index_pushes();
    assert_eq!(pushes.len(), 1);
    let push = &pushes[0];
    assert_eq!(push.tag, "2.1.0");
    assert_eq!(push.digest, digest);
    assert_eq!(sha256_digest(&push.document), digest);

    let index: ImageIndex = serde_json::from_slice(&push.document).expect("valid index JSON");
    assert_eq!(index.schema_version, 2);
    assert_eq!(index.media_type, MEDIA_TYPE_IMAGE_INDEX);
    assert_eq!(index.manifests.len(), 2);
    assert_eq!(index.manifests[1].digest, manifest_digest_for("mac"));
    let annotations = index.annotations.expect("annotations");
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[ANNOTATION_VERSION], "2.1.0");
}

#[tokio::test]
async fn all_failed_results_never_reach_the_registry() {
    let registry = RecordingRegistry::default();
    let results = vec![ArtifactUploadResult::failed(
        &artifact("linux", "linux", "amd64"),
        "binary not found",
    )];

    let err = create_manifest_index(&registry, &results, "1.0.0")
        .await
        .expect_err("nothing to index");

    assert!(matches!(err, IndexError::NoManifests));
    assert!(err.to_string().contains("no successfully uploaded manifests"));
    assert!(registry.index_pushes().is_empty());
}

#[tokio::test]
async fn malformed_digest_is_rejected_before_push() {
    let registry = RecordingRegistry::default();
    let mut result = uploaded("linux", "linux", "amd64");
    result.digest = "sha256:XYZ".to_string();

    let err = create_manifest_index(&registry, &[result], "1.0.0")
        .await
        .expect_err("invalid digest");

    assert!(matches!(err, IndexError::InvalidDigest { .. }));
    assert!(registry.index_pushes().is_empty());
}

#[tokio::test]
async fn push_failure_is_reported() {
    let registry = RecordingRegistry::failing_index();
    let err = create_manifest_index(&registry, &[uploaded("linux", "linux", "amd64")], "1.0.0")
        .await
        .expect_err("push fails");
    assert!(matches!(err, IndexError::Push(_)));
    assert!(err.to_string().contains("HTTP 403"));
}
