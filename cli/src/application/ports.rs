//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared types crate;
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use agent_metadata_common::{ArtifactDefinition, Digest, SigningRequest};
use anyhow::Result;

use crate::domain::{PathError, SigningError};

// ── Value Types ───────────────────────────────────────────────────────────────

/// A manifest that now exists in the registry, addressed by digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedManifest {
    /// Digest of the manifest document.
    pub digest: Digest,
    /// Size of the manifest document in bytes.
    pub size: u64,
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Read-only checks on declared binary paths.
pub trait ArtifactFiles {
    /// Resolve `declared` against `workspace` and confirm it is a readable,
    /// non-empty regular file. Returns the resolved path.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] describing why the path cannot be published.
    fn validate_binary_path(&self, workspace: &Path, declared: &str) -> Result<PathBuf, PathError>;
}

// ── Registry Port ─────────────────────────────────────────────────────────────

/// OCI registry operations used by the publication pipeline.
#[allow(async_fn_in_trait)]
pub trait RegistryClient {
    /// Push one binary as a single-layer manifest, addressed by digest only.
    async fn upload_artifact(
        &self,
        artifact: &ArtifactDefinition,
        file: &Path,
        version: &str,
    ) -> Result<PushedManifest>;

    /// Push an already-encoded image index under `tag`.
    ///
    /// `digest` must be the digest of `document`.
    async fn push_index(&self, document: &[u8], digest: &Digest, tag: &str) -> Result<()>;
}

// ── Signing Port ──────────────────────────────────────────────────────────────

/// Remote signing service.
#[allow(async_fn_in_trait)]
pub trait ArtifactSigner {
    /// Ask the service to sign the referenced artifact.
    ///
    /// # Errors
    ///
    /// Returns a [`SigningError`]; [`SigningError::is_retryable`] tells the
    /// caller whether another attempt may succeed.
    async fn sign_artifact(
        &self,
        client_id: &str,
        request: &SigningRequest,
    ) -> Result<(), SigningError>;
}

// ── Timing Port ───────────────────────────────────────────────────────────────

/// Backoff sleeping, injectable so tests can observe delays without waiting.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
