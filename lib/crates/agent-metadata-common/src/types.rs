use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::{ArtifactDefinition, ArtifactFormat};
use crate::digest::{Digest, SHA256};

/// Per-artifact outcome threaded through the upload, index and signing stages.
///
/// `uploaded` is true exactly when `digest` is set and `error` is empty; the
/// constructors below are the only way the upload stage builds one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactUploadResult {
    pub name: String,
    pub path: String,
    pub os: String,
    pub arch: String,
    pub format: ArtifactFormat,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub digest: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    pub uploaded: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default)]
    pub signed: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signing_error: String,
}

impl ArtifactUploadResult {
    fn from_definition(artifact: &ArtifactDefinition) -> Self {
        Self {
            name: artifact.name.clone(),
            path: artifact.path.clone(),
            os: artifact.os.clone(),
            arch: artifact.arch.clone(),
            format: artifact.format,
            digest: String::new(),
            size: 0,
            tag: String::new(),
            uploaded: false,
            error: String::new(),
            signed: false,
            signing_error: String::new(),
        }
    }

    /// A manifest pushed by digest; `tag` is the release tag the index will carry.
    #[must_use]
    pub fn uploaded(artifact: &ArtifactDefinition, digest: &Digest, size: u64, tag: &str) -> Self {
        Self {
            digest: digest.to_string(),
            size,
            tag: tag.to_string(),
            uploaded: true,
            ..Self::from_definition(artifact)
        }
    }

    /// An artifact that was not uploaded. An empty message is replaced so the
    /// failure is never silent.
    #[must_use]
    pub fn failed(artifact: &ArtifactDefinition, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "upload failed".to_string();
        }
        Self {
            error,
            ..Self::from_definition(artifact)
        }
    }

    /// Mark an uploaded artifact as covered by a successful index signature.
    #[must_use]
    pub fn signed(self) -> Self {
        if !self.uploaded {
            return self;
        }
        Self {
            signed: true,
            signing_error: String::new(),
            ..self
        }
    }

    /// Record why signing did not complete for an uploaded artifact.
    #[must_use]
    pub fn signing_failed(self, error: impl Into<String>) -> Self {
        if !self.uploaded {
            return self;
        }
        Self {
            signed: false,
            signing_error: error.into(),
            ..self
        }
    }
}

/// True if any artifact in the batch was not uploaded. False for an empty batch.
#[must_use]
pub fn has_failures(results: &[ArtifactUploadResult]) -> bool {
    results.iter().any(|r| !r.uploaded)
}

/// Body of a signing-service call for one pushed index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningRequest {
    pub registry: String,
    pub repository: String,
    pub tag: String,
    pub digest: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningRequestError {
    #[error("signing request field '{0}' cannot be empty")]
    MissingField(&'static str),

    #[error("signing request digest '{0}' must start with 'sha256:'")]
    UnsupportedDigest(String),
}

impl SigningRequest {
    pub fn validate(&self) -> Result<(), SigningRequestError> {
        for (field, value) in [
            ("registry", &self.registry),
            ("repository", &self.repository),
            ("tag", &self.tag),
            ("digest", &self.digest),
        ] {
            if value.is_empty() {
                return Err(SigningRequestError::MissingField(field));
            }
        }
        if !self.digest.starts_with(&format!("{SHA256}:")) {
            return Err(SigningRequestError::UnsupportedDigest(self.digest.clone()));
        }
        Ok(())
    }
}
