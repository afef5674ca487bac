//! Signing-service error taxonomy and HTTP status classification.

use agent_metadata_common::SigningRequestError;
use thiserror::Error;

use crate::domain::retry::AttemptError;

/// Longest response body excerpt carried in an error message.
pub const MAX_BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signing client id cannot be empty")]
    MissingClientId,

    #[error("invalid signing request: {0}")]
    InvalidRequest(#[from] SigningRequestError),

    #[error("invalid signing service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("signing service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("signing request failed: {0}")]
    Transport(String),
}

impl SigningError {
    /// Bad input and malformed URLs are final; server-side trouble and
    /// transport failures may clear up.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MissingClientId | Self::InvalidRequest(_) | Self::InvalidUrl { .. } => false,
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::Transport(_) => true,
        }
    }
}

impl From<SigningError> for AttemptError {
    fn from(error: SigningError) -> Self {
        if error.is_retryable() {
            Self::retryable(error)
        } else {
            Self::non_retryable(error)
        }
    }
}

/// 5xx, 408 (request timeout) and 429 (rate limited) are retryable; every
/// other non-success status is not.
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

/// Trimmed response body, at most [`MAX_BODY_PREVIEW_CHARS`] characters
/// including the trailing ellipsis.
#[must_use]
pub fn body_preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    match trimmed.char_indices().nth(MAX_BODY_PREVIEW_CHARS - 3) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
