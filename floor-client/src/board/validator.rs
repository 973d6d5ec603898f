//! Drop validation
//!
//! Pure check of a proposed drop against the cached schedule. Runs on every
//! hover for the accept/reject styling and once more on drop.

use std::fmt;

use shared::models::Schedule;
use shared::timeslot::{SlotError, SlotGrid, TimeSlot};

use super::drag::{DragSession, DropTarget};

/// Why a drop is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRejection {
    /// Dropped back on its own cell; ignored silently
    SameCell,
    /// Window would run past closing, or the target slot is not in service
    PastClosing { start: TimeSlot, span: usize },
    Capacity { guests: i32, min: i32, max: i32 },
    /// Target table is not laid out in one of the window slots
    UnknownTable { table_id: i64, slot: TimeSlot },
    /// Target table is under maintenance or unavailable
    Blocked { table_id: i64, slot: TimeSlot },
    /// Another active reservation holds the table in the window
    Conflict { slot: TimeSlot, reservation_id: i64 },
}

impl DropRejection {
    /// Shown while the pointer is over the cell
    pub fn is_silent(&self) -> bool {
        matches!(self, DropRejection::SameCell)
    }
}

impl fmt::Display for DropRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropRejection::SameCell => write!(f, "Reservation is already here"),
            DropRejection::PastClosing { start, .. } => {
                write!(f, "A reservation starting at {} would run past closing", start)
            }
            DropRejection::Capacity { guests, min, max } => write!(
                f,
                "{} guests do not fit a table for {}-{}",
                guests, min, max
            ),
            DropRejection::UnknownTable { table_id, slot } => {
                write!(f, "Table {} is not available at {}", table_id, slot)
            }
            DropRejection::Blocked { table_id, slot } => {
                write!(f, "Table {} is blocked at {}", table_id, slot)
            }
            DropRejection::Conflict { slot, .. } => {
                write!(f, "Table is already booked at {}", slot)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropVerdict {
    Accept,
    Reject(DropRejection),
}

/// Visual feedback for the hovered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Accept,
    Reject,
}

impl DropVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DropVerdict::Accept)
    }

    pub fn affordance(&self) -> Affordance {
        match self {
            DropVerdict::Accept => Affordance::Accept,
            DropVerdict::Reject(_) => Affordance::Reject,
        }
    }

    pub fn rejection(&self) -> Option<DropRejection> {
        match self {
            DropVerdict::Accept => None,
            DropVerdict::Reject(r) => Some(*r),
        }
    }
}

/// Decide whether `session` may land on `target`
pub fn validate(
    schedule: &Schedule,
    grid: &SlotGrid,
    session: &DragSession,
    target: DropTarget,
) -> DropVerdict {
    match check(schedule, grid, session, target) {
        Ok(()) => DropVerdict::Accept,
        Err(rejection) => DropVerdict::Reject(rejection),
    }
}

fn check(
    schedule: &Schedule,
    grid: &SlotGrid,
    session: &DragSession,
    target: DropTarget,
) -> Result<(), DropRejection> {
    if target == session.source() {
        return Err(DropRejection::SameCell);
    }

    let span = grid.span_for(session.reservation.duration_minutes);
    let window = grid.window(target.time, span).map_err(|e| match e {
        SlotError::PastClosing { start, span } => DropRejection::PastClosing { start, span },
        _ => DropRejection::PastClosing {
            start: target.time,
            span,
        },
    })?;

    let first = schedule
        .cell(target.table_id, target.time)
        .ok_or(DropRejection::UnknownTable {
            table_id: target.table_id,
            slot: target.time,
        })?;
    let guests = session.guest_count();
    if !first.fits(guests) {
        return Err(DropRejection::Capacity {
            guests,
            min: first.min_guests,
            max: first.max_guests,
        });
    }

    for &slot in window {
        let cell = schedule
            .cell(target.table_id, slot)
            .ok_or(DropRejection::UnknownTable {
                table_id: target.table_id,
                slot,
            })?;
        if cell.status.is_blocked() {
            return Err(DropRejection::Blocked {
                table_id: target.table_id,
                slot,
            });
        }
        if let Some(other) = cell.active_reservation()
            && other.id != session.reservation_id()
        {
            return Err(DropRejection::Conflict {
                slot,
                reservation_id: other.id,
            });
        }
    }
    Ok(())
}
