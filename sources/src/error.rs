//! Error taxonomy for the provider adapters.
//!
//! The poll loop treats these differently: transport and provider errors are
//! transient and only skip the current cycle, authentication failures flip
//! the source into a degraded state until the configuration changes.
//!

use thiserror::Error;

/// Everything that can go wrong while talking to a provider.
///
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level failure, timeout or connection refused
    #[error("transport error: {0}")]
    Transport(String),
    /// Credentials rejected (401/403) or missing where required
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Body did not parse or lacked the structural marker field
    #[error("malformed answer: {0}")]
    Malformed(String),
    /// The provider answered with an in-band error (quota, bad request)
    #[error("provider error: {0}")]
    Provider(String),
    /// Site name not present in the configuration
    #[error("unknown site {0}")]
    UnknownSite(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return SourceError::Auth(e.to_string());
            }
        }
        SourceError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_malformed() {
        let e = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let e = SourceError::from(e);
        assert!(matches!(e, SourceError::Malformed(_)));
    }
}
