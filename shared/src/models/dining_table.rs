//! Dining Table Model

use serde::{Deserialize, Serialize};

use super::reservation::ReservationSummary;

/// Smallest party any table accepts
pub const MIN_TABLE_CAPACITY: i32 = 1;

/// Largest party any table accepts
pub const MAX_TABLE_CAPACITY: i32 = 20;

/// Table status at one time slot (桌台状态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
    Unavailable,
}

impl TableStatus {
    /// Status implies an attached booking
    pub fn is_booked(&self) -> bool {
        matches!(self, Self::Occupied | Self::Reserved)
    }

    /// Status keeps the table out of service
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Maintenance | Self::Unavailable)
    }
}

/// One table at one time slot: the unit of the schedule matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(alias = "id")]
    pub table_id: i64,
    #[serde(default)]
    pub table_name: String,
    #[serde(default = "default_min_guests")]
    pub min_guests: i32,
    #[serde(default = "default_max_guests")]
    pub max_guests: i32,
    pub status: TableStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationSummary>,
}

fn default_min_guests() -> i32 {
    MIN_TABLE_CAPACITY
}

fn default_max_guests() -> i32 {
    MAX_TABLE_CAPACITY
}

impl TableCell {
    /// Free cell
    pub fn available(table_id: i64, name: impl Into<String>, min_guests: i32, max_guests: i32) -> Self {
        Self {
            table_id,
            table_name: name.into(),
            min_guests,
            max_guests,
            status: TableStatus::Available,
            reservation: None,
        }
    }

    /// Attach a booking, moving the cell into `Reserved`
    pub fn book(&mut self, reservation: ReservationSummary) {
        self.status = TableStatus::Reserved;
        self.reservation = Some(reservation);
    }

    /// Drop the booking, returning the cell to `Available`
    pub fn clear(&mut self) -> Option<ReservationSummary> {
        if self.status.is_booked() {
            self.status = TableStatus::Available;
        }
        self.reservation.take()
    }

    /// Active reservation held by this cell, if any
    pub fn active_reservation(&self) -> Option<&ReservationSummary> {
        self.reservation.as_ref().filter(|r| r.status.is_active())
    }

    /// Only cells holding an active, non-canceled reservation can be dragged
    pub fn is_draggable(&self) -> bool {
        self.status.is_booked() && self.active_reservation().is_some()
    }

    /// Inclusive capacity check
    pub fn fits(&self, guests: i32) -> bool {
        self.min_guests <= guests && guests <= self.max_guests
    }

    /// Repair cells the backend sent in an inconsistent state
    ///
    /// A reservation only stays attached while the status reflects a booking,
    /// and a booked status without an active reservation falls back to
    /// `Available`.
    pub fn normalize(&mut self) {
        match (&self.reservation, self.status.is_booked()) {
            (Some(_), false) => self.reservation = None,
            (Some(r), true) if !r.status.is_active() => {
                self.reservation = None;
                self.status = TableStatus::Available;
            }
            (None, true) => self.status = TableStatus::Available,
            _ => {}
        }
    }
}
