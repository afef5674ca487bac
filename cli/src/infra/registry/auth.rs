//! Registry authentication: static Basic credentials, upgraded to a Bearer
//! token when the registry answers with a token challenge.

use std::collections::HashMap;
use std::fmt;

/// Username/password for one registry host.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// `None` when no username is configured (anonymous access).
    #[must_use]
    pub fn from_parts(username: &str, password: &str) -> Option<Self> {
        if username.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A parsed `WWW-Authenticate: Bearer ...` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerChallenge {
    pub realm: String,
    pub service: Option<String>,
    pub scope: Option<String>,
}

impl BearerChallenge {
    /// Query parameters for the token endpoint.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, &str)> {
        let mut query = Vec::new();
        if let Some(service) = &self.service {
            query.push(("service", service.as_str()));
        }
        if let Some(scope) = &self.scope {
            query.push(("scope", scope.as_str()));
        }
        query
    }
}

/// Parse a `WWW-Authenticate` header value. Returns `None` for non-Bearer
/// schemes or a challenge without a realm.
#[must_use]
pub fn parse_bearer_challenge(header: &str) -> Option<BearerChallenge> {
    let header = header.trim();
    let (scheme, params) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let mut params = parse_params(params);
    Some(BearerChallenge {
        realm: params.remove("realm").filter(|r| !r.is_empty())?,
        service: params.remove("service"),
        scope: params.remove("scope"),
    })
}

/// `key="value", key2=value2` → map. Commas inside quotes are kept.
fn parse_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut rest = input.trim();
    while !rest.is_empty() {
        let Some((key, after_eq)) = rest.split_once('=') else {
            break;
        };
        let key = key.trim().trim_start_matches(',').trim().to_ascii_lowercase();
        let (value, remainder) = if let Some(quoted) = after_eq.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            }
        } else {
            match after_eq.find(',') {
                Some(end) => (&after_eq[..end], &after_eq[end..]),
                None => (after_eq, ""),
            }
        };
        params.insert(key, value.trim().to_string());
        rest = remainder.trim_start_matches([',', ' ']);
    }
    params
}

/// Token endpoint response; registries use either field name.
#[derive(Debug, serde::Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

impl TokenResponse {
    #[must_use]
    pub fn into_token(self) -> Option<String> {
        self.token
            .or(self.access_token)
            .filter(|token| !token.is_empty())
    }
}
