//! Property-based tests for path validation, upload ordering and registry parsing.

#![allow(clippy::expect_used)]

use std::path::Path;

use agent_metadata_cli::application::services::upload::upload_artifacts;
use agent_metadata_cli::domain::PathError;
use agent_metadata_cli::domain::parse_registry_url;
use agent_metadata_cli::infra::fs::validate_binary_path;
use agent_metadata_common::{ArtifactUploadResult, has_failures};
use proptest::prelude::*;

use crate::mocks::{FakeFiles, RecordingRegistry, artifact};

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.-]{1,12}".prop_filter("not a parent segment", |s| s != "..")
}

fn path_with_parent_segment() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(segment(), 0..4),
        prop::collection::vec(segment(), 0..4),
        prop::sample::select(vec!['/', '\\']),
    )
        .prop_map(|(before, after, sep)| {
            let mut parts = before;
            parts.push("..".to_string());
            parts.extend(after);
            parts.join(&sep.to_string())
        })
}

proptest! {
    #[test]
    fn traversal_is_rejected_without_touching_the_filesystem(path in path_with_parent_segment()) {
        // The workspace does not exist; only the traversal rule can answer.
        let workspace = Path::new("/nonexistent-workspace-for-proptest");
        let result = validate_binary_path(workspace, &path);
        prop_assert_eq!(result, Err(PathError::DirectoryTraversal(path.clone())));
    }

    #[test]
    fn upload_results_match_input_length_and_order(
        names in prop::collection::hash_set("[a-z][a-z0-9_-]{0,8}", 0..8),
        fail_mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let failing: Vec<&str> = names
            .iter()
            .zip(&fail_mask)
            .filter(|(_, fail)| **fail)
            .map(|(name, _)| name.as_str())
            .collect();
        let registry = RecordingRegistry::failing(&failing);
        let artifacts: Vec<_> = names.iter().map(|n| artifact(n, "linux", "amd64")).collect();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let results = runtime.block_on(upload_artifacts(
            &registry,
            &FakeFiles::default(),
            &artifacts,
            Path::new("/work"),
            "1.0.0",
        ));

        prop_assert_eq!(results.len(), artifacts.len());
        for (result, declared) in results.iter().zip(&artifacts) {
            prop_assert_eq!(&result.name, &declared.name);
            prop_assert_eq!(result.uploaded, !result.digest.is_empty() && result.error.is_empty());
        }
        prop_assert_eq!(has_failures(&results), !failing.is_empty());
    }

    #[test]
    fn has_failures_iff_any_not_uploaded(flags in prop::collection::vec(any::<bool>(), 0..10)) {
        let results: Vec<ArtifactUploadResult> = flags
            .iter()
            .enumerate()
            .map(|(i, ok)| {
                let a = artifact(&format!("a{i}"), "linux", "amd64");
                if *ok {
                    ArtifactUploadResult::uploaded(&a, &crate::mocks::manifest_digest_for(&a.name), 1, "1.0.0")
                } else {
                    ArtifactUploadResult::failed(&a, "boom")
                }
            })
            .collect();
        prop_assert_eq!(has_failures(&results), flags.iter().any(|ok| !ok));
    }

    #[test]
    fn registry_urls_split_at_the_first_slash(
        host in "[a-z][a-z0-9.-]{0,15}(:[0-9]{1,5})?",
        repo in "[a-z0-9]+(/[a-z0-9_-]+){0,3}",
        scheme in prop::sample::select(vec!["", "http://", "https://"]),
    ) {
        let parsed = parse_registry_url(&format!("{scheme}{host}/{repo}")).expect("valid");
        prop_assert_eq!(parsed.host, host);
        prop_assert_eq!(parsed.repository, repo);
    }
}
