//! Signing-service client implementing `ArtifactSigner` over reqwest.

use std::time::Duration;

use agent_metadata_common::SigningRequest;
use anyhow::{Context, Result};
use reqwest::{Client, Url};

use crate::application::ports::ArtifactSigner;
use crate::domain::signing::{SigningError, body_preview};

/// Per-request timeout for signing calls.
pub const SIGNING_TIMEOUT: Duration = Duration::from_secs(30);

/// `POST {base}/v1/signing/{clientId}/sign` with a bearer token.
pub struct HttpSigningClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl HttpSigningClient {
    /// Build a client with the default 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse or the HTTP client cannot be built.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(SIGNING_TIMEOUT)
            .build()
            .context("building signing HTTP client")?;
        Ok(Self::with_client(http, base_url, token)?)
    }

    /// Build around an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_client(
        http: Client,
        base_url: &str,
        token: impl Into<String>,
    ) -> Result<Self, SigningError> {
        let base_url = Url::parse(base_url).map_err(|e| SigningError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    fn sign_url(&self, client_id: &str) -> Result<Url, SigningError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SigningError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "signing", client_id, "sign"]);
        Ok(url)
    }
}

impl ArtifactSigner for HttpSigningClient {
    async fn sign_artifact(
        &self,
        client_id: &str,
        request: &SigningRequest,
    ) -> Result<(), SigningError> {
        if client_id.is_empty() {
            return Err(SigningError::MissingClientId);
        }
        request.validate()?;
        let url = self.sign_url(client_id)?;

        tracing::debug!(url = %url, digest = %request.digest, tag = %request.tag, "calling signing service");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| SigningError::Transport(format!("{:#}", anyhow::Error::from(e))))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "signing accepted");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SigningError::Status {
            status: status.as_u16(),
            body: body_preview(&body),
        })
    }
}
