//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Reservation errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Reservation ====================
    ReservationNotFound = 4001,
    /// Another active reservation overlaps the requested window
    ReservationConflict = 4002,
    /// Requested window falls outside opening hours
    OutsideBusinessHours = 4003,
    /// Guest count outside the table's seating bounds
    GuestCountOutOfRange = 4004,
    /// Reservation is canceled, completed or a no-show
    ReservationNotActive = 4005,

    // ==================== 7xxx: Table ====================
    TableNotFound = 7001,
    TableOccupied = 7002,
    /// Table in maintenance or otherwise blocked
    TableUnavailable = 7003,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    NetworkError = 9003,
    TimeoutError = 9004,
    ConfigError = 9005,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationConflict => "Table is already booked for that time",
            ErrorCode::OutsideBusinessHours => "Reservation falls outside business hours",
            ErrorCode::GuestCountOutOfRange => "Guest count does not fit the table",
            ErrorCode::ReservationNotActive => "Reservation is no longer active",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is occupied",
            ErrorCode::TableUnavailable => "Table is unavailable",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }

    /// Whether the backend rejected a placement because the slot is taken
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorCode::ReservationConflict | ErrorCode::TableOccupied | ErrorCode::AlreadyExists
        )
    }

    /// Whether the backend rejected the payload on business/validation grounds
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorCode::ValidationFailed
                | ErrorCode::InvalidRequest
                | ErrorCode::InvalidFormat
                | ErrorCode::ValueOutOfRange
                | ErrorCode::OutsideBusinessHours
                | ErrorCode::GuestCountOutOfRange
                | ErrorCode::ReservationNotActive
                | ErrorCode::TableUnavailable
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Reservation
            4001 => Ok(ErrorCode::ReservationNotFound),
            4002 => Ok(ErrorCode::ReservationConflict),
            4003 => Ok(ErrorCode::OutsideBusinessHours),
            4004 => Ok(ErrorCode::GuestCountOutOfRange),
            4005 => Ok(ErrorCode::ReservationNotActive),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7003 => Ok(ErrorCode::TableUnavailable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_roundtrip_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ReservationConflict,
            ErrorCode::GuestCountOutOfRange,
            ErrorCode::TableUnavailable,
            ErrorCode::NetworkError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::ReservationConflict.to_string(), "E4002");
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
    }

    #[test]
    fn test_error_code_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::OutsideBusinessHours).unwrap();
        assert_eq!(json, "4003");
        let code: ErrorCode = serde_json::from_str("7001").unwrap();
        assert_eq!(code, ErrorCode::TableNotFound);
    }

    #[test]
    fn test_conflict_and_validation_classification() {
        assert!(ErrorCode::ReservationConflict.is_conflict());
        assert!(!ErrorCode::ReservationConflict.is_validation());
        assert!(ErrorCode::GuestCountOutOfRange.is_validation());
        assert!(ErrorCode::OutsideBusinessHours.is_validation());
        assert!(!ErrorCode::NetworkError.is_conflict());
        assert!(!ErrorCode::NetworkError.is_validation());
    }
}
