//! Action input loading: artifact declarations and the release version.
//!
//! Declarations arrive either inline (`INPUT_BINARIES`, a JSON array) or from
//! a YAML/JSON file; YAML is a superset of JSON so one parser covers both.

use std::path::Path;

use agent_metadata_common::ArtifactDefinition;
use anyhow::{Context, Result, bail};

use crate::domain::registry::is_valid_tag;

/// Parse an inline JSON array of artifact declarations. Blank input means none.
///
/// # Errors
///
/// Returns an error if the input is not a valid declaration list.
pub fn parse_binaries_json(raw: &str) -> Result<Vec<ArtifactDefinition>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).context("cannot parse binaries JSON")
}

/// Load artifact declarations from a YAML or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_binaries_file(path: &Path) -> Result<Vec<ArtifactDefinition>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

/// Require a semantic version usable as an OCI tag; it becomes the index tag verbatim.
///
/// # Errors
///
/// Returns an error if `raw` is empty, not a valid semantic version, or not a valid tag
/// (build metadata's `+` is outside the tag grammar).
pub fn parse_version(raw: &str) -> Result<String> {
    let version = raw.trim();
    if version.is_empty() {
        bail!("version is required");
    }
    let parsed = semver::Version::parse(version)
        .with_context(|| format!("version '{version}' is not a valid semantic version"))?;
    if !parsed.build.is_empty() {
        bail!(
            "version '{version}' carries build metadata '+{}', which cannot be used as an OCI tag",
            parsed.build
        );
    }
    if !is_valid_tag(version) {
        bail!("version '{version}' is not a valid OCI tag");
    }
    Ok(version.to_string())
}
