//! Unified error system
//!
//! This module provides the error vocabulary shared by the backend API and
//! the floor client:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Reservation errors
//! - 7xxx: Table errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::ReservationConflict);
//!
//! let err = AppError::with_message(ErrorCode::GuestCountOutOfRange, "Table seats 2-4 guests")
//!     .with_detail("table_id", 2);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(4004));
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
