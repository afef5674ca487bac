//! Application service: artifact validation and per-artifact upload.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::{Path, PathBuf};

use agent_metadata_common::{ArtifactDefinition, ArtifactUploadResult};
use futures_util::{StreamExt as _, stream};

use crate::application::ports::{ArtifactFiles, RegistryClient};

/// Check every declared binary path and collect all failures.
///
/// Returns the resolved paths in declaration order, or one
/// `"<name>: <reason>"` line per invalid artifact.
///
/// # Errors
///
/// Returns the failure lines if any artifact path is invalid.
pub fn validate_artifacts(
    files: &impl ArtifactFiles,
    artifacts: &[ArtifactDefinition],
    workspace: &Path,
) -> Result<Vec<PathBuf>, Vec<String>> {
    let mut resolved = Vec::with_capacity(artifacts.len());
    let mut failures = Vec::new();

    for artifact in artifacts {
        match files.validate_binary_path(workspace, &artifact.path) {
            Ok(path) => resolved.push(path),
            Err(e) => failures.push(format!("{}: {e}", artifact.name)),
        }
    }

    if failures.is_empty() {
        Ok(resolved)
    } else {
        Err(failures)
    }
}

/// Upload every artifact in declaration order.
///
/// Never aborts early: a failing artifact is recorded with `uploaded = false`
/// and the next one is attempted. The returned vector has one entry per input.
pub async fn upload_artifacts(
    registry: &impl RegistryClient,
    files: &impl ArtifactFiles,
    artifacts: &[ArtifactDefinition],
    workspace: &Path,
    version: &str,
) -> Vec<ArtifactUploadResult> {
    stream::iter(artifacts)
        .then(|artifact| upload_artifact(registry, files, artifact, workspace, version))
        .collect()
        .await
}

/// Resolve, validate and push a single artifact.
pub async fn upload_artifact(
    registry: &impl RegistryClient,
    files: &impl ArtifactFiles,
    artifact: &ArtifactDefinition,
    workspace: &Path,
    version: &str,
) -> ArtifactUploadResult {
    let path = match files.validate_binary_path(workspace, &artifact.path) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(artifact = %artifact.name, error = %e, "artifact path rejected");
            return ArtifactUploadResult::failed(artifact, e.to_string());
        }
    };

    tracing::info!(artifact = %artifact.name, path = %path.display(), "uploading artifact");
    match registry.upload_artifact(artifact, &path, version).await {
        Ok(pushed) => {
            tracing::info!(
                artifact = %artifact.name,
                digest = %pushed.digest,
                size = pushed.size,
                "artifact uploaded"
            );
            ArtifactUploadResult::uploaded(artifact, &pushed.digest, pushed.size, version)
        }
        Err(e) => {
            tracing::warn!(artifact = %artifact.name, error = %format!("{e:#}"), "artifact upload failed");
            ArtifactUploadResult::failed(artifact, format!("{e:#}"))
        }
    }
}
