//! Errors raised while collecting leaderboard data.

use thiserror::Error;

/// Errors that can occur when fetching or validating upstream data.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid {field} in position of {trader}: {reason}")]
    Validation {
        trader: String,
        field: &'static str,
        reason: String,
    },
}

impl CollectorError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CollectorError::Http(e) => e.is_timeout() || e.is_connect(),
            CollectorError::Api { status, .. } => *status == 429 || *status >= 500,
            CollectorError::Validation { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_transient_by_status() {
        let api = |status| CollectorError::Api { status, body: String::new() };
        assert!(api(503).is_transient());
        assert!(api(429).is_transient());
        assert!(!api(403).is_transient());
        assert!(!api(400).is_transient());
    }

    #[test]
    fn test_validation_message() {
        let err = CollectorError::Validation {
            trader: "uid1".to_string(),
            field: "leverage",
            reason: "must be at least 1".to_string(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "invalid leverage in position of uid1: must be at least 1");
    }
}
