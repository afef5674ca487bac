//! Application service: release index assembly and push.

use agent_metadata_common::{ArtifactUploadResult, Digest};

use crate::application::ports::RegistryClient;
use crate::domain::digest::encode_document;
use crate::domain::error::IndexError;
use crate::domain::manifest::build_index;

/// Build the multi-platform index over uploaded artifacts, push it tagged with
/// `version`, and return its digest.
///
/// The registry is not contacted unless at least one artifact was uploaded.
///
/// # Errors
///
/// Returns an [`IndexError`] if there is nothing to index, a recorded digest
/// is malformed, or the push fails.
pub async fn create_manifest_index(
    registry: &impl RegistryClient,
    results: &[ArtifactUploadResult],
    version: &str,
) -> Result<Digest, IndexError> {
    let index = build_index(results, version)?;
    let (document, digest) = encode_document(&index)?;

    tracing::info!(
        manifests = index.manifests.len(),
        digest = %digest,
        tag = version,
        "pushing manifest index"
    );
    registry
        .push_index(&document, &digest, version)
        .await
        .map_err(IndexError::Push)?;

    Ok(digest)
}
