//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for LunchSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LunchError {
    /// A mutating operation was attempted without a signed-in identity.
    #[error("Authentication required: you must sign in first")]
    AuthenticationRequired,

    /// The remote store failed, refused or timed out.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Severity levels for monitoring and log routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl LunchError {
    /// Shorthand for building a [`LunchError::StoreUnavailable`].
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Whether repeating the identical operation may succeed.
    ///
    /// Store writes are idempotent upserts keyed by stable identifiers, so a
    /// store failure is always safe to retry. Everything else fails the same
    /// way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// How loudly the error should be reported.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AuthenticationRequired | Self::InvalidInput(_) => ErrorSeverity::Info,
            Self::StoreUnavailable(_) => ErrorSeverity::Warning,
            Self::Config(_) => ErrorSeverity::Error,
        }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "authentication_required",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
        }
    }
}

/// Result type alias for LunchSync operations
pub type Result<T> = std::result::Result<T, LunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_failures_are_retryable() {
        assert!(LunchError::store("timeout").is_retryable());
        assert!(!LunchError::AuthenticationRequired.is_retryable());
        assert!(!LunchError::InvalidInput("bad".into()).is_retryable());
        assert!(!LunchError::Config("missing".into()).is_retryable());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(LunchError::store("offline")).unwrap();
        assert_eq!(json["type"], "StoreUnavailable");
        assert_eq!(json["message"], "offline");

        let json = serde_json::to_value(LunchError::AuthenticationRequired).unwrap();
        assert_eq!(json["type"], "AuthenticationRequired");
    }

    #[test]
    fn severity_and_label() {
        assert_eq!(LunchError::AuthenticationRequired.severity(), ErrorSeverity::Info);
        assert_eq!(LunchError::store("x").severity(), ErrorSeverity::Warning);
        assert_eq!(LunchError::store("x").label(), "store_unavailable");
    }
}
