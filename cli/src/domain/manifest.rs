//! OCI document construction: single-layer artifact manifests and the
//! multi-platform release index.
//!
//! Pure functions only. Timestamps are passed in by the caller.

use agent_metadata_common::oci::{
    ANNOTATION_ARTIFACT_TYPE, ANNOTATION_CREATED, ANNOTATION_TITLE, ANNOTATION_VERSION,
    ARTIFACT_TYPE_BINARY, Annotations, EMPTY_JSON_DATA, MEDIA_TYPE_EMPTY_JSON,
    MEDIA_TYPE_IMAGE_INDEX, MEDIA_TYPE_IMAGE_MANIFEST, SCHEMA_VERSION,
};
use agent_metadata_common::{
    ArtifactDefinition, ArtifactUploadResult, Descriptor, Digest, ImageIndex, Manifest, Platform,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::digest::sha256_digest;
use crate::domain::error::IndexError;

/// Descriptor of the binary layer, annotated with file name, version and artifact kind.
#[must_use]
pub fn layer_descriptor(
    artifact: &ArtifactDefinition,
    digest: Digest,
    size: u64,
    file_name: &str,
    version: &str,
) -> Descriptor {
    let mut layer = Descriptor::new(artifact.format.media_type(), digest, size);
    layer.annotations = Some(Annotations::from([
        (ANNOTATION_TITLE.to_string(), file_name.to_string()),
        (ANNOTATION_VERSION.to_string(), version.to_string()),
        (
            ANNOTATION_ARTIFACT_TYPE.to_string(),
            ARTIFACT_TYPE_BINARY.to_string(),
        ),
    ]));
    layer
}

/// Descriptor of the `{}` config blob shared by every artifact manifest.
#[must_use]
pub fn empty_config_descriptor() -> Descriptor {
    Descriptor::new(
        MEDIA_TYPE_EMPTY_JSON,
        sha256_digest(EMPTY_JSON_DATA),
        EMPTY_JSON_DATA.len() as u64,
    )
}

/// Pack a manifest referencing exactly one layer.
#[must_use]
pub fn pack_manifest(
    artifact_type: String,
    config: Descriptor,
    layer: Descriptor,
    created: DateTime<Utc>,
) -> Manifest {
    Manifest {
        schema_version: SCHEMA_VERSION,
        media_type: MEDIA_TYPE_IMAGE_MANIFEST.to_string(),
        artifact_type: Some(artifact_type),
        config,
        layers: vec![layer],
        annotations: Some(Annotations::from([(
            ANNOTATION_CREATED.to_string(),
            created.to_rfc3339_opts(SecondsFormat::Secs, true),
        )])),
    }
}

/// Build the release index over every uploaded artifact.
///
/// Results with `uploaded == false` are skipped; the caller decides whether
/// their presence is fatal.
///
/// # Errors
///
/// Returns [`IndexError::NoManifests`] if nothing was uploaded, or
/// [`IndexError::InvalidDigest`] if a recorded digest does not parse.
pub fn build_index(
    results: &[ArtifactUploadResult],
    version: &str,
) -> Result<ImageIndex, IndexError> {
    let manifests = results
        .iter()
        .filter(|r| r.uploaded)
        .map(manifest_descriptor)
        .collect::<Result<Vec<_>, _>>()?;

    if manifests.is_empty() {
        return Err(IndexError::NoManifests);
    }

    Ok(ImageIndex {
        schema_version: SCHEMA_VERSION,
        media_type: MEDIA_TYPE_IMAGE_INDEX.to_string(),
        manifests,
        annotations: Some(Annotations::from([(
            ANNOTATION_VERSION.to_string(),
            version.to_string(),
        )])),
    })
}

fn manifest_descriptor(result: &ArtifactUploadResult) -> Result<Descriptor, IndexError> {
    let digest = result
        .digest
        .parse::<Digest>()
        .map_err(|cause| IndexError::InvalidDigest {
            name: result.name.clone(),
            cause,
        })?;
    let mut descriptor = Descriptor::new(MEDIA_TYPE_IMAGE_MANIFEST, digest, result.size);
    descriptor.platform = Some(Platform {
        architecture: result.arch.clone(),
        os: result.os.clone(),
    });
    descriptor.artifact_type = Some(result.format.media_type());
    Ok(descriptor)
}
