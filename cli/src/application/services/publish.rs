//! Application service: the publication pipeline.
//!
//! `Disabled → no-op`; otherwise validate → upload all → build and push the
//! index → sign the index with bounded retry. Every stage after validation is
//! fail-fast: an upload failure never reaches the index, an index failure
//! never reaches signing. Nothing is rolled back.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::path::PathBuf;

use agent_metadata_common::{
    ArtifactUploadResult, Digest, OciConfig, SigningRequest, has_failures,
};
use serde::Serialize;
use thiserror::Error;

use crate::application::ports::{
    ArtifactFiles, ArtifactSigner, ProgressReporter, RegistryClient, Sleeper,
};
use crate::application::services::index::create_manifest_index;
use crate::application::services::retry::RetryExecutor;
use crate::application::services::upload::{upload_artifacts, validate_artifacts};
use crate::domain::error::PublishError;
use crate::domain::registry::parse_registry_url;
use crate::domain::retry::{AttemptError, RetryError};

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything one publication run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub config: OciConfig,
    /// Root against which relative artifact paths are resolved.
    pub workspace: PathBuf,
    /// Release version: the index tag and the version annotation.
    pub version: String,
    /// Signing-service client identifier.
    pub client_id: String,
}

/// Result of a completed run.
#[derive(Debug)]
pub enum PublicationOutcome {
    /// No registry configured; nothing was done.
    Disabled,
    /// Artifacts uploaded, index pushed and signed.
    Published(PublicationReport),
}

/// Summary of a successful publication.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationReport {
    pub registry: String,
    pub repository: String,
    pub tag: String,
    pub index_digest: String,
    pub results: Vec<ArtifactUploadResult>,
}

/// Terminal pipeline error together with the per-artifact results gathered
/// before it occurred. `results` is empty when validation failed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PublishFailure {
    pub error: PublishError,
    pub results: Vec<ArtifactUploadResult>,
}

impl PublishFailure {
    fn new(error: impl Into<PublishError>, results: Vec<ArtifactUploadResult>) -> Self {
        Self {
            error: error.into(),
            results,
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run the publication pipeline.
///
/// # Errors
///
/// Returns a [`PublishFailure`] naming the first stage that failed.
pub async fn publish_release<S: Sleeper>(
    registry: &impl RegistryClient,
    signer: &impl ArtifactSigner,
    files: &impl ArtifactFiles,
    retry: &RetryExecutor<'_, S>,
    reporter: &impl ProgressReporter,
    request: &PublishRequest,
) -> Result<PublicationOutcome, PublishFailure> {
    let config = &request.config;
    if !config.is_enabled() {
        tracing::info!("no OCI registry configured, skipping binary publication");
        return Ok(PublicationOutcome::Disabled);
    }

    // Validate everything before touching the network.
    config.validate().map_err(|e| PublishFailure::new(e, Vec::new()))?;
    let target =
        parse_registry_url(&config.registry).map_err(|e| PublishFailure::new(e, Vec::new()))?;

    reporter.step(&format!("validating {} artifact(s)...", config.artifacts.len()));
    validate_artifacts(files, &config.artifacts, &request.workspace).map_err(|failures| {
        PublishFailure::new(PublishError::Validation { failures }, Vec::new())
    })?;
    reporter.success("artifacts validated");

    // Upload.
    reporter.step(&format!("uploading artifacts to {target}..."));
    let results = upload_artifacts(
        registry,
        files,
        &config.artifacts,
        &request.workspace,
        &request.version,
    )
    .await;
    if has_failures(&results) {
        let failures = results
            .iter()
            .filter(|r| !r.uploaded)
            .map(|r| format!("{}: {}", r.name, r.error))
            .collect();
        return Err(PublishFailure::new(PublishError::Upload { failures }, results));
    }
    reporter.success(&format!("{} artifact(s) uploaded", results.len()));

    // Index.
    reporter.step(&format!("pushing manifest index {}:{}...", target, request.version));
    let index_digest = match create_manifest_index(registry, &results, &request.version).await {
        Ok(digest) => digest,
        Err(e) => return Err(PublishFailure::new(e, results)),
    };
    reporter.success(&format!("manifest index pushed ({index_digest})"));

    // Sign.
    reporter.step("signing manifest index...");
    let signing_request = SigningRequest {
        registry: target.host.clone(),
        repository: target.repository.clone(),
        tag: request.version.clone(),
        digest: index_digest.to_string(),
    };
    match sign_index(signer, retry, &request.client_id, &signing_request).await {
        Ok(()) => {
            reporter.success("manifest index signed");
            let results = results.into_iter().map(ArtifactUploadResult::signed).collect();
            Ok(PublicationOutcome::Published(report(
                target.host,
                target.repository,
                request,
                &index_digest,
                results,
            )))
        }
        Err(e) => {
            let message = e.to_string();
            reporter.warn(&format!("signing failed: {message}"));
            let results = results
                .into_iter()
                .map(|r| r.signing_failed(message.clone()))
                .collect();
            Err(PublishFailure::new(PublishError::Signing(e), results))
        }
    }
}

async fn sign_index<S: Sleeper>(
    signer: &impl ArtifactSigner,
    retry: &RetryExecutor<'_, S>,
    client_id: &str,
    request: &SigningRequest,
) -> Result<(), RetryError> {
    retry
        .execute(move |attempt| async move {
            tracing::debug!(attempt, digest = %request.digest, "requesting signature");
            signer
                .sign_artifact(client_id, request)
                .await
                .map_err(AttemptError::from)
        })
        .await
}

fn report(
    registry: String,
    repository: String,
    request: &PublishRequest,
    index_digest: &Digest,
    results: Vec<ArtifactUploadResult>,
) -> PublicationReport {
    PublicationReport {
        registry,
        repository,
        tag: request.version.clone(),
        index_digest: index_digest.to_string(),
        results,
    }
}
