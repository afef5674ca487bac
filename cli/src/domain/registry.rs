//! Registry reference parsing (`host[:port]/repository`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::RegistryUrlError;

/// OCI distribution tag grammar.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]{0,127}$").expect("valid regex")
});

/// True if `tag` can name a manifest in a registry.
#[must_use]
pub fn is_valid_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag)
}

/// A registry host plus repository path, e.g. `docker.io` + `newrelic/agents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRef {
    pub host: String,
    pub repository: String,
}

impl RegistryRef {
    /// Local registries (`localhost:*`, `127.0.0.1:*`) are reached over plaintext HTTP.
    #[must_use]
    pub fn uses_plain_http(&self) -> bool {
        let name = self
            .host
            .rsplit_once(':')
            .map_or(self.host.as_str(), |(name, _)| name);
        name == "localhost" || name == "127.0.0.1"
    }

    /// Base URL of the distribution API, e.g. `https://docker.io`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.uses_plain_http() { "http" } else { "https" };
        format!("{scheme}://{}", self.host)
    }
}

impl fmt::Display for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.repository)
    }
}

/// Split `registry/repository` into host (with optional port) and path.
///
/// Accepts `host/path` as well as `http://host/path` and `https://host/path`.
///
/// # Errors
///
/// Returns an error if the input is empty or lacks a host or a repository.
pub fn parse_registry_url(url: &str) -> Result<RegistryRef, RegistryUrlError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(RegistryUrlError::Empty);
    }
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    let missing = || RegistryUrlError::MissingRepository(url.to_string());
    let (host, repository) = without_scheme.split_once('/').ok_or_else(missing)?;
    if host.is_empty() || repository.is_empty() {
        return Err(missing());
    }
    Ok(RegistryRef {
        host: host.to_string(),
        repository: repository.to_string(),
    })
}
