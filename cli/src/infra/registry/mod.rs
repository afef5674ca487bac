//! OCI distribution client implementing `RegistryClient` over reqwest.
//!
//! Blobs are pushed monolithically (`POST` + `PUT ?digest=`) after a `HEAD`
//! existence check; manifests are pushed by digest and the index by tag.
//! Every push runs under one wall-clock timeout.

pub mod auth;
pub mod store;

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use agent_metadata_common::oci::{EMPTY_JSON_DATA, MEDIA_TYPE_IMAGE_INDEX, MEDIA_TYPE_IMAGE_MANIFEST};
use agent_metadata_common::{ArtifactDefinition, Digest};
use anyhow::{Context, Result, anyhow, bail};
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, WWW_AUTHENTICATE};
use reqwest::{Body, Client, Method, RequestBuilder, Response, StatusCode, Url};

use crate::application::ports::{PushedManifest, RegistryClient};
use crate::domain::digest::encode_document;
use crate::domain::manifest::{empty_config_descriptor, layer_descriptor, pack_manifest};
use crate::domain::registry::RegistryRef;
use crate::domain::signing::body_preview;

use self::auth::{BearerChallenge, Credentials, TokenResponse, parse_bearer_challenge};
use self::store::StagedBlob;

/// Default wall-clock budget for one artifact or index push.
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(600);

const USER_AGENT: &str = concat!("agent-metadata/", env!("CARGO_PKG_VERSION"));

/// Registry client bound to one `host/repository`.
pub struct OciRegistryClient {
    http: Client,
    base: Url,
    target: RegistryRef,
    credentials: Option<Credentials>,
    token: Mutex<Option<String>>,
    push_timeout: Duration,
}

impl OciRegistryClient {
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(
        target: RegistryRef,
        credentials: Option<Credentials>,
        push_timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building registry HTTP client")?;
        let base = Url::parse(&target.base_url())
            .with_context(|| format!("invalid registry URL {}", target.base_url()))?;
        Ok(Self {
            http,
            base,
            target,
            credentials,
            token: Mutex::new(None),
            push_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(&format!("/v2/{}/{path}", self.target.repository))
            .with_context(|| format!("building registry URL for {path}"))
    }

    async fn with_timeout<T>(&self, what: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.push_timeout, fut)
            .await
            .map_err(|_| anyhow!("{what} timed out after {}s", self.push_timeout.as_secs()))?
    }

    // ── Transport ────────────────────────────────────────────────────────────

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.token.lock().ok().and_then(|guard| guard.clone());
        match (token, &self.credentials) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(creds)) => request.basic_auth(&creds.username, Some(&creds.password)),
            (None, None) => request,
        }
    }

    /// Send a request, answering one Bearer challenge if the registry asks.
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let response = self.authorize(build()).send().await?;
        if !self.answer_challenge(&response).await? {
            return Ok(response);
        }
        Ok(self.authorize(build()).send().await?)
    }

    /// Fetch and cache a token if `response` is a 401 with a Bearer challenge.
    /// Returns whether the request should be sent again.
    async fn answer_challenge(&self, response: &Response) -> Result<bool> {
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let Some(challenge) = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer_challenge)
        else {
            return Ok(false);
        };

        let token = self.fetch_token(&challenge).await?;
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token);
        }
        Ok(true)
    }

    async fn fetch_token(&self, challenge: &BearerChallenge) -> Result<String> {
        tracing::debug!(realm = %challenge.realm, "requesting registry token");
        let mut request = self.http.get(&challenge.realm).query(&challenge.query());
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }
        let response = request.send().await.context("requesting registry token")?;
        let response =
            expect_status(response, &[StatusCode::OK], "requesting registry token").await?;
        response
            .json::<TokenResponse>()
            .await
            .context("decoding registry token response")?
            .into_token()
            .ok_or_else(|| anyhow!("registry token response did not contain a token"))
    }

    // ── Blobs ────────────────────────────────────────────────────────────────

    async fn blob_exists(&self, digest: &Digest) -> Result<bool> {
        let url = self.endpoint(&format!("blobs/{digest}"))?;
        let response = self
            .send(|| self.http.head(url.clone()))
            .await
            .with_context(|| format!("checking blob {digest}"))?;
        Ok(response.status().is_success())
    }

    async fn push_blob(&self, blob: &StagedBlob) -> Result<()> {
        if self.blob_exists(&blob.digest).await? {
            tracing::debug!(digest = %blob.digest, "blob already present, skipping upload");
            return Ok(());
        }

        let start = self.endpoint("blobs/uploads/")?;
        let response = self
            .send(|| self.http.post(start.clone()))
            .await
            .context("starting blob upload")?;
        let response =
            expect_status(response, &[StatusCode::ACCEPTED], "starting blob upload").await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| anyhow!("registry did not return an upload location"))?;
        let mut upload_url = self
            .base
            .join(location)
            .with_context(|| format!("invalid upload location {location}"))?;
        upload_url
            .query_pairs_mut()
            .append_pair("digest", &blob.digest.to_string());

        tracing::debug!(digest = %blob.digest, size = blob.size, "uploading blob");
        let response = self
            .put_blob_body(&upload_url, blob)
            .await
            .with_context(|| format!("uploading blob {}", blob.digest))?;
        expect_status(
            response,
            &[StatusCode::CREATED],
            &format!("uploading blob {}", blob.digest),
        )
        .await?;
        Ok(())
    }

    /// `PUT` the blob content. A streamed body cannot be replayed, so a
    /// challenged request reopens the blob for its second attempt.
    async fn put_blob_body(&self, url: &Url, blob: &StagedBlob) -> Result<Response> {
        let put = |body: Body| {
            self.http
                .put(url.clone())
                .header(CONTENT_TYPE, "application/octet-stream")
                .header(CONTENT_LENGTH, blob.size)
                .body(body)
        };
        let response = self.authorize(put(blob.body().await?)).send().await?;
        if !self.answer_challenge(&response).await? {
            return Ok(response);
        }
        Ok(self.authorize(put(blob.body().await?)).send().await?)
    }

    // ── Manifests ────────────────────────────────────────────────────────────

    async fn put_manifest(&self, reference: &str, media_type: &str, document: Bytes) -> Result<()> {
        let url = self.endpoint(&format!("manifests/{reference}"))?;
        tracing::debug!(reference, media_type, size = document.len(), "pushing manifest");
        let response = self
            .send(|| {
                self.http
                    .request(Method::PUT, url.clone())
                    .header(CONTENT_TYPE, media_type)
                    .body(document.clone())
            })
            .await
            .with_context(|| format!("pushing manifest {reference}"))?;
        expect_status(
            response,
            &[StatusCode::CREATED, StatusCode::OK],
            &format!("pushing manifest {reference}"),
        )
        .await?;
        Ok(())
    }
}

impl RegistryClient for OciRegistryClient {
    async fn upload_artifact(
        &self,
        artifact: &ArtifactDefinition,
        file: &Path,
        version: &str,
    ) -> Result<PushedManifest> {
        let media_type = artifact.format.media_type();
        let file_name = file
            .file_name()
            .map_or_else(|| artifact.name.clone(), |name| name.to_string_lossy().into_owned());

        let layer_blob = StagedBlob::stage_file(file)
            .await
            .with_context(|| format!("staging {}", file.display()))?;
        let config_blob = StagedBlob::from_bytes(Bytes::from_static(EMPTY_JSON_DATA));

        let layer = layer_descriptor(
            artifact,
            layer_blob.digest.clone(),
            layer_blob.size,
            &file_name,
            version,
        );
        let manifest = pack_manifest(media_type, empty_config_descriptor(), layer, Utc::now());
        let (document, digest) = encode_document(&manifest).context("encoding artifact manifest")?;
        let size = document.len() as u64;

        self.with_timeout(&format!("pushing {}", artifact.name), async {
            self.push_blob(&config_blob).await?;
            self.push_blob(&layer_blob).await?;
            self.put_manifest(
                &digest.to_string(),
                MEDIA_TYPE_IMAGE_MANIFEST,
                Bytes::from(document),
            )
            .await
        })
        .await?;

        Ok(PushedManifest { digest, size })
    }

    async fn push_index(&self, document: &[u8], digest: &Digest, tag: &str) -> Result<()> {
        let document = Bytes::copy_from_slice(document);
        tracing::debug!(digest = %digest, tag, "pushing index by tag");
        self.with_timeout(
            &format!("pushing index {tag}"),
            self.put_manifest(tag, MEDIA_TYPE_IMAGE_INDEX, document),
        )
        .await
    }
}

/// Fail with status and a body preview unless the response status is one of `expected`.
async fn expect_status(
    response: Response,
    expected: &[StatusCode],
    what: &str,
) -> Result<Response> {
    let status = response.status();
    if expected.contains(&status) {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("{what}: registry returned HTTP {}: {}", status.as_u16(), body_preview(&body))
}
