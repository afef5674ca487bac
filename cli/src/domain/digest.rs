//! Content addressing helpers for in-memory documents.

use agent_metadata_common::Digest;
use serde::Serialize;
use sha2::{Digest as _, Sha256};

/// SHA-256 digest of a byte slice.
#[must_use]
pub fn sha256_digest(data: &[u8]) -> Digest {
    let hash: [u8; 32] = Sha256::digest(data).into();
    Digest::from_sha256(&hash)
}

/// Serialize a document to compact JSON and compute the digest of exactly those bytes.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn encode_document<T: Serialize>(document: &T) -> Result<(Vec<u8>, Digest), serde_json::Error> {
    let bytes = serde_json::to_vec(document)?;
    let digest = sha256_digest(&bytes);
    Ok((bytes, digest))
}
