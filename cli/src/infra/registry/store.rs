//! Content staged for a push: digest and size are known before any network call.

use std::path::{Path, PathBuf};

use agent_metadata_common::Digest;
use anyhow::{Context, Result, bail};
use bytes::Bytes;
use reqwest::Body;

use crate::domain::digest::sha256_digest;
use crate::infra::fs::sha256_file;

#[derive(Debug, Clone)]
enum Content {
    Memory(Bytes),
    File(PathBuf),
}

/// A content-addressed blob ready to be uploaded.
#[derive(Debug, Clone)]
pub struct StagedBlob {
    pub digest: Digest,
    pub size: u64,
    content: Content,
}

impl StagedBlob {
    #[must_use]
    pub fn from_bytes(data: Bytes) -> Self {
        Self {
            digest: sha256_digest(&data),
            size: data.len() as u64,
            content: Content::Memory(data),
        }
    }

    /// Hash a file on the blocking pool; the file is streamed again at upload time.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn stage_file(path: &Path) -> Result<Self> {
        let owned = path.to_path_buf();
        let (digest, size) = tokio::task::spawn_blocking(move || sha256_file(&owned))
            .await
            .context("spawn_blocking for sha256_file")??;
        Ok(Self {
            digest,
            size,
            content: Content::File(path.to_path_buf()),
        })
    }

    /// A fresh request body. Staged files are streamed from disk, never buffered.
    ///
    /// The registry verifies the digest on `PUT ?digest=`; a length mismatch is
    /// caught here before sending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its length changed.
    pub async fn body(&self) -> Result<Body> {
        match &self.content {
            Content::Memory(data) => Ok(Body::from(data.clone())),
            Content::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("opening {}", path.display()))?;
                let len = file
                    .metadata()
                    .await
                    .with_context(|| format!("reading metadata of {}", path.display()))?
                    .len();
                if len != self.size {
                    bail!(
                        "{} changed while uploading (expected {} bytes, found {len})",
                        path.display(),
                        self.size
                    );
                }
                Ok(Body::from(file))
            }
        }
    }
}
