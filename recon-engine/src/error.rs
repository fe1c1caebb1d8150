//! Error types for recon-engine
//!
//! Stage errors are values, not control flow: the orchestrator turns them
//! into terminal statuses and the pollers turn them into attempt outcomes.

use thiserror::Error;

/// Failure of one remote stage call
#[derive(Debug, Error)]
pub enum StageError {
    /// Connection could not be established at all
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    /// Transport failure after connecting (timeout, reset, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Remote side answered with a non-2xx status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body is not the JSON we expect
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP client could not be built
    #[error("Client setup error: {0}")]
    ClientSetup(String),
}

impl StageError {
    /// Classify a reqwest transport error
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() {
            StageError::Unreachable(err.to_string())
        } else {
            StageError::Network(err.to_string())
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, StageError::Unreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_remote_text() {
        let err = StageError::Api(502, "Bad Gateway".to_string());
        assert_eq!(err.to_string(), "API error 502: Bad Gateway");
    }

    #[test]
    fn test_only_unreachable_is_unreachable() {
        assert!(StageError::Unreachable("refused".to_string()).is_unreachable());
        assert!(!StageError::Network("reset".to_string()).is_unreachable());
        assert!(!StageError::Parse("eof".to_string()).is_unreachable());
    }
}
