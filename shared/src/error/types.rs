//! Error types and API response structures

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Provides:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (conflicting reservation id, table bounds, ...)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create an invalid format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidFormat, msg)
    }

    /// Create a reservation conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ReservationConflict, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

/// Unified API response structure
///
/// Provides a consistent response format for all API endpoints:
/// - `code`: Error code (0 for success)
/// - `message`: Human-readable message
/// - `data`: Response payload (on success)
/// - `details`: Additional error details (on failure)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code (0 for success, non-zero for errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional error details (present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// Whether the envelope reports success (missing code counts as success)
    pub fn is_success(&self) -> bool {
        matches!(self.code, None | Some(0))
    }

    /// Convert an error envelope back into an [`AppError`]
    ///
    /// Unknown codes collapse to [`ErrorCode::Unknown`] but keep the message.
    pub fn to_app_error(&self) -> AppError {
        let code = self
            .code
            .and_then(|c| ErrorCode::try_from(c).ok())
            .unwrap_or(ErrorCode::Unknown);
        AppError {
            code,
            message: if self.message.is_empty() {
                code.message().to_string()
            } else {
                self.message.clone()
            },
            details: self.details.clone(),
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::ReservationNotFound);
        assert_eq!(err.code, ErrorCode::ReservationNotFound);
        assert_eq!(err.message, "Reservation not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::conflict("Table 2 is booked at 19:00")
            .with_detail("table_id", 2)
            .with_detail("time", "19:00");

        assert_eq!(err.code, ErrorCode::ReservationConflict);
        let details = err.details.unwrap();
        assert_eq!(details.get("table_id").unwrap(), 2);
        assert_eq!(details.get("time").unwrap(), "19:00");
    }

    #[test]
    fn test_api_response_error_roundtrip() {
        let err = AppError::with_message(ErrorCode::GuestCountOutOfRange, "Too many guests");
        let response = ApiResponse::<()>::error(&err);
        let json = serde_json::to_string(&response).unwrap();

        let parsed: ApiResponse<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert!(!parsed.is_success());
        let back = parsed.to_app_error();
        assert_eq!(back.code, ErrorCode::GuestCountOutOfRange);
        assert_eq!(back.message, "Too many guests");
    }

    #[test]
    fn test_api_response_unknown_code() {
        let parsed: ApiResponse<()> =
            serde_json::from_str(r#"{"code": 4999, "message": ""}"#).unwrap();
        let err = parsed.to_app_error();
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_eq!(err.message, "An unknown error occurred");
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Booking {
        id: i64,
    }

    #[test]
    fn test_api_response_payload_without_default() {
        let parsed: ApiResponse<Booking> =
            serde_json::from_str(r#"{"code": 0, "message": "OK", "data": {"id": 3}}"#).unwrap();
        assert_eq!(parsed.data, Some(Booking { id: 3 }));

        let parsed: ApiResponse<Booking> =
            serde_json::from_str(r#"{"code": 4002, "message": "taken"}"#).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.to_app_error().code, ErrorCode::ReservationConflict);
    }

    #[test]
    fn test_api_response_success_without_code() {
        let parsed: ApiResponse<i64> = serde_json::from_str(r#"{"data": 7}"#).unwrap();
        assert!(parsed.is_success());
        assert_eq!(parsed.data, Some(7));
    }
}
