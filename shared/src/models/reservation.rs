//! Reservation Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::timeslot::TimeSlot;

/// Reservation lifecycle status (预订状态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Seated,
    Completed,
    #[serde(alias = "cancelled")]
    Canceled,
    NoShow,
}

impl ReservationStatus {
    /// Still holds its table
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Seated)
    }
}

/// Reservation summary attached to a schedule cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub id: i64,
    pub guest_name: String,
    pub guest_count: i32,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub status: ReservationStatus,
    /// Explicit length; the restaurant average applies when absent
    #[serde(default, alias = "duration")]
    pub duration_minutes: Option<u32>,
}

/// Reservation record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub table_id: i64,
    pub date: NaiveDate,
    pub time: TimeSlot,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub guest_name: String,
    pub guest_count: i32,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn summary(&self) -> ReservationSummary {
        ReservationSummary {
            id: self.id,
            guest_name: self.guest_name.clone(),
            guest_count: self.guest_count,
            phone: self.phone.clone(),
            email: self.email.clone(),
            status: self.status,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Move payload: `PATCH /api/reservations/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationMove {
    pub table_id: i64,
    pub time: TimeSlot,
    pub date: NaiveDate,
    pub timezone: String,
}

/// Cancel payload: `PATCH /api/reservations/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCancel {
    pub status: ReservationStatus,
    pub timezone: String,
}

impl ReservationCancel {
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            status: ReservationStatus::Canceled,
            timezone: timezone.into(),
        }
    }
}
