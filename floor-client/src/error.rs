//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Structured error envelope returned by the API
    #[error("API error {code}: {message}")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Slot already taken (409 without a structured body)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How a failed mutation is reported to the user
///
/// All kinds roll back the same way; only the message differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Backend found an overlapping booking
    Conflict,
    /// Capacity, business hours or payload rejected
    Validation,
    /// Transport failure, timeout or server error
    Network,
}

impl ClientError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ClientError::Conflict(_) => FailureKind::Conflict,
            ClientError::Validation(_) | ClientError::NotFound(_) => FailureKind::Validation,
            ClientError::Api { code, .. } if code.is_conflict() => FailureKind::Conflict,
            ClientError::Api { code, .. } if code.is_validation() => FailureKind::Validation,
            ClientError::Api {
                code: ErrorCode::ReservationNotFound | ErrorCode::TableNotFound | ErrorCode::NotFound,
                ..
            } => FailureKind::Validation,
            _ => FailureKind::Network,
        }
    }

    /// Message safe to show to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Conflict(msg) | ClientError::Validation(msg) if !msg.is_empty() => {
                msg.clone()
            }
            ClientError::Conflict(_) => ErrorCode::ReservationConflict.message().to_string(),
            ClientError::Http(e) if e.is_timeout() => "Request timed out".to_string(),
            ClientError::Http(_) => "Network error, please retry".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        ClientError::Api {
            code: err.code,
            message: err.message,
            details: err
                .details
                .map(|d| serde_json::Value::Object(d.into_iter().collect())),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
