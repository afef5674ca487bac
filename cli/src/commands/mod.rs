//! Command implementations

pub mod publish;
pub mod validate;
pub mod version;

use std::path::PathBuf;

use agent_metadata_common::{ArtifactDefinition, OciConfig};
use anyhow::Result;
use clap::Args;

use crate::infra::inputs::{load_binaries_file, parse_binaries_json};

/// Registry target and artifact declarations, shared by `publish` and `validate`.
///
/// Every flag falls back to the GitHub Actions `INPUT_*` variable.
#[derive(Args)]
pub struct OciArgs {
    /// Registry host and repository, e.g. docker.io/newrelic/agents (empty disables publishing)
    #[arg(long, env = "INPUT_OCI_REGISTRY", default_value = "")]
    pub registry: String,

    /// Registry username (anonymous when empty)
    #[arg(long, env = "INPUT_OCI_USERNAME", default_value = "")]
    pub username: String,

    /// Registry password
    #[arg(long, env = "INPUT_OCI_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Artifact declarations as a JSON array
    #[arg(long, env = "INPUT_BINARIES")]
    pub binaries: Option<String>,

    /// Artifact declarations from a YAML or JSON file (takes precedence over --binaries)
    #[arg(long)]
    pub binaries_file: Option<PathBuf>,

    /// Root against which relative artifact paths are resolved
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,
}

impl OciArgs {
    /// Artifact declarations from the file, else the inline JSON, else none.
    ///
    /// # Errors
    ///
    /// Returns an error if the declarations cannot be read or parsed.
    pub fn artifacts(&self) -> Result<Vec<ArtifactDefinition>> {
        if let Some(path) = &self.binaries_file {
            return load_binaries_file(path);
        }
        match &self.binaries {
            Some(raw) => parse_binaries_json(raw),
            None => Ok(Vec::new()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the artifact declarations cannot be loaded.
    pub fn oci_config(&self) -> Result<OciConfig> {
        Ok(OciConfig {
            registry: self.registry.trim().to_string(),
            username: self.username.clone(),
            password: self.password.clone(),
            artifacts: self.artifacts()?,
        })
    }
}

/// `None` for unset or blank values.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
