//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::net`.
//! Adapter errors arrive as `anyhow::Error` and are carried, not inspected.

use agent_metadata_common::{ArtifactError, DigestError};
use thiserror::Error;

use crate::domain::retry::RetryError;

// ── Path errors ───────────────────────────────────────────────────────────────

/// Why a declared binary path cannot be published.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path '{0}' contains a '..' segment (directory traversal is not allowed)")]
    DirectoryTraversal(String),

    #[error("binary not found or unreadable: {0}")]
    NotFound(String),

    #[error("binary path is a directory: {0}")]
    IsDirectory(String),

    #[error("binary file is empty: {0}")]
    EmptyFile(String),
}

// ── Registry URL errors ───────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryUrlError {
    #[error("registry URL cannot be empty")]
    Empty,

    #[error("registry URL must contain both domain and repository path: {0}")]
    MissingRepository(String),
}

// ── Index errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no successfully uploaded manifests to include in the index")]
    NoManifests,

    #[error("artifact '{name}' has an invalid digest: {cause}")]
    InvalidDigest { name: String, cause: DigestError },

    #[error("encoding manifest index: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("pushing manifest index: {0:#}")]
    Push(anyhow::Error),
}

// ── Publication errors ────────────────────────────────────────────────────────

/// Terminal error of one publication run.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid OCI configuration: {0}")]
    Config(#[from] ArtifactError),

    #[error("invalid OCI registry: {0}")]
    Registry(#[from] RegistryUrlError),

    #[error("binary upload failed: invalid artifacts: {}", .failures.join("; "))]
    Validation { failures: Vec<String> },

    #[error("binary upload failed: {}", .failures.join("; "))]
    Upload { failures: Vec<String> },

    #[error("manifest index creation failed: {0}")]
    Index(#[from] IndexError),

    #[error("index signing failed: {0}")]
    Signing(RetryError),
}

impl PublishError {
    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "INVALID_CONFIG",
            Self::Registry(_) => "INVALID_REGISTRY",
            Self::Validation { .. } => "INVALID_ARTIFACT",
            Self::Upload { .. } => "UPLOAD_FAILED",
            Self::Index(_) => "INDEX_FAILED",
            Self::Signing(_) => "SIGNING_FAILED",
        }
    }
}
