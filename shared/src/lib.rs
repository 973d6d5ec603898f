//! Shared types for the floor client
//!
//! Wire and domain types used by the table schedule: restaurant profile,
//! dining tables, table cells, reservations, schedules and time slots,
//! plus the unified error codes and API response envelope.

pub mod error;
pub mod models;
pub mod timeslot;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use timeslot::{OperatingHours, SlotGrid, TimeSlot};
