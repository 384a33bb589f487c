//! Error types for quota operations

use thiserror::Error;

/// Failure reported by a cloud SDK call.
///
/// The message is kept exactly as the SDK produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SdkError {
    pub message: String,
    /// HTTP status of the failed call, when the SDK talks HTTP
    pub status: Option<u16>,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// Main error type for quota operations
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("{sdk} is required to manage quotas but is not available")]
    DependencyUnavailable { sdk: String },

    #[error("To manage quotas, the installed version of {sdk} MUST be >={minimum} (found {found})")]
    UnsupportedVersion {
        sdk: String,
        found: String,
        minimum: String,
    },

    #[error("{message}")]
    CloudOperation {
        operation: &'static str,
        message: String,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl QuotaError {
    pub(crate) fn cloud(operation: &'static str, err: SdkError) -> Self {
        QuotaError::CloudOperation {
            operation,
            message: err.message,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        QuotaError::InvalidRequest {
            message: message.into(),
        }
    }
}
