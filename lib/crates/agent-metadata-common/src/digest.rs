//! Content digests (`<algorithm>:<encoded>`) as defined by the OCI image spec.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SHA256: &str = "sha256";
pub const SHA512: &str = "sha512";

/// `component (separator component)*` with `[a-z0-9]+` components and `[+._-]` separators.
static ALGORITHM_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]+(?:[+._-][a-z0-9]+)*$").expect("valid regex")
});

static ENCODED_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z0-9=_-]+$").expect("valid regex")
});

static SHA256_HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-f0-9]{64}$").expect("valid regex")
});

static SHA512_HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-f0-9]{128}$").expect("valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("digest cannot be empty")]
    Empty,

    #[error("digest '{0}' is missing the ':' separator")]
    MissingSeparator(String),

    #[error("digest '{0}' has an invalid algorithm")]
    InvalidAlgorithm(String),

    #[error("digest '{0}' has an invalid checksum")]
    InvalidEncoded(String),
}

/// A validated content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    algorithm: String,
    encoded: String,
}

impl Digest {
    /// Build a digest from its parts, validating both.
    pub fn new(algorithm: &str, encoded: &str) -> Result<Self, DigestError> {
        let raw = || format!("{algorithm}:{encoded}");
        if !ALGORITHM_RE.is_match(algorithm) {
            return Err(DigestError::InvalidAlgorithm(raw()));
        }
        let encoded_re = match algorithm {
            SHA256 => &SHA256_HEX_RE,
            SHA512 => &SHA512_HEX_RE,
            _ => &ENCODED_RE,
        };
        if !encoded_re.is_match(encoded) {
            return Err(DigestError::InvalidEncoded(raw()));
        }
        Ok(Self {
            algorithm: algorithm.to_string(),
            encoded: encoded.to_string(),
        })
    }

    /// A `sha256:` digest from a raw 32-byte hash.
    #[must_use]
    pub fn from_sha256(hash: &[u8; 32]) -> Self {
        Self {
            algorithm: SHA256.to_string(),
            encoded: hex::encode(hash),
        }
    }

}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DigestError::Empty);
        }
        let (algorithm, encoded) = s
            .split_once(':')
            .ok_or_else(|| DigestError::MissingSeparator(s.to_string()))?;
        Self::new(algorithm, encoded)
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Digest> for String {
    fn from(value: Digest) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.encoded)
    }
}
