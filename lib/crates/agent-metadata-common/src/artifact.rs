use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oci::AGENT_MEDIA_TYPE_PREFIX;

/// Artifact names: `[a-zA-Z0-9_-]+`, anchored at both ends.
pub static ARTIFACT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid regex")
});

/// `os` and `arch` values: the `any` wildcard or a plain alphanumeric token.
pub static PLATFORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(any|[a-zA-Z0-9]+)$").expect("valid regex")
});

/// Archive format of a published agent binary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactFormat {
    #[serde(rename = "tar")]
    Tar,
    #[serde(rename = "tar+gzip")]
    TarGzip,
    #[serde(rename = "zip")]
    Zip,
}

impl ArtifactFormat {
    pub const ALL: [Self; 3] = [Self::Tar, Self::TarGzip, Self::Zip];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGzip => "tar+gzip",
            Self::Zip => "zip",
        }
    }

    /// Media type used both as the manifest `artifactType` and the layer media type,
    /// e.g. `application/vnd.newrelic.agent.v1+tar+gzip`.
    #[must_use]
    pub fn media_type(self) -> String {
        format!("{AGENT_MEDIA_TYPE_PREFIX}{}", self.as_str())
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactFormat {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ArtifactError::InvalidFormat(s.to_string()))
    }
}

/// Validation failures for artifact declarations and the OCI config.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("invalid artifact name '{0}': must match [a-zA-Z0-9_-]+")]
    InvalidName(String),

    #[error("artifact '{name}': path cannot be empty")]
    EmptyPath { name: String },

    #[error("artifact '{name}': os '{value}' must be 'any' or alphanumeric")]
    InvalidOs { name: String, value: String },

    #[error("artifact '{name}': arch '{value}' must be 'any' or alphanumeric")]
    InvalidArch { name: String, value: String },

    #[error("unsupported artifact format '{0}': expected one of tar, tar+gzip, zip")]
    InvalidFormat(String),

    #[error("duplicate artifact name '{0}'")]
    DuplicateName(String),

    #[error("OCI registry is configured but no artifacts were declared")]
    NoArtifacts,
}

/// One platform-specific binary to publish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactDefinition {
    pub name: String,
    pub path: String,
    pub os: String,
    pub arch: String,
    pub format: ArtifactFormat,
}

impl ArtifactDefinition {
    /// Check name, path, os and arch. The format is already constrained by its type.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if !is_valid_artifact_name(&self.name) {
            return Err(ArtifactError::InvalidName(self.name.clone()));
        }
        if self.path.trim().is_empty() {
            return Err(ArtifactError::EmptyPath {
                name: self.name.clone(),
            });
        }
        if !is_valid_platform_field(&self.os) {
            return Err(ArtifactError::InvalidOs {
                name: self.name.clone(),
                value: self.os.clone(),
            });
        }
        if !is_valid_platform_field(&self.arch) {
            return Err(ArtifactError::InvalidArch {
                name: self.name.clone(),
                value: self.arch.clone(),
            });
        }
        Ok(())
    }
}

/// Returns `true` if `name` matches `[a-zA-Z0-9_-]+`.
#[must_use]
pub fn is_valid_artifact_name(name: &str) -> bool {
    ARTIFACT_NAME_RE.is_match(name)
}

fn is_valid_platform_field(value: &str) -> bool {
    PLATFORM_RE.is_match(value)
}

/// Registry target and credentials for binary publication.
///
/// `registry` holds host and repository together, e.g. `docker.io/newrelic/agents`.
/// An empty registry disables publication entirely.
#[derive(Clone, Default)]
pub struct OciConfig {
    pub registry: String,
    pub username: String,
    pub password: String,
    pub artifacts: Vec<ArtifactDefinition>,
}

impl OciConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Validate every declaration and name uniqueness. A disabled config is always valid.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if !self.is_enabled() {
            return Ok(());
        }
        if self.artifacts.is_empty() {
            return Err(ArtifactError::NoArtifacts);
        }
        let mut seen = HashSet::new();
        for artifact in &self.artifacts {
            artifact.validate()?;
            if !seen.insert(artifact.name.as_str()) {
                return Err(ArtifactError::DuplicateName(artifact.name.clone()));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for OciConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OciConfig")
            .field("registry", &self.registry)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .field("artifacts", &self.artifacts)
            .finish()
    }
}
