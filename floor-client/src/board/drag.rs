//! Drag session tracker
//!
//! One gesture at a time: `Idle → Dragging → Committing → Idle`. Reservations
//! whose move is still in flight stay locked across gestures until the
//! coordinator settles them.

use std::collections::HashSet;

use shared::models::{ReservationSummary, Schedule, TableCell};
use shared::timeslot::TimeSlot;
use thiserror::Error;

use super::validator::DropVerdict;
use crate::schedule::{RefreshHold, ScheduleCache};

/// Reservation picked up by the user
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub reservation: ReservationSummary,
    pub source_table_id: i64,
    pub source_time: TimeSlot,
}

impl DragSession {
    /// Session for a draggable cell
    pub fn from_cell(cell: &TableCell, time: TimeSlot) -> Option<Self> {
        if !cell.is_draggable() {
            return None;
        }
        let reservation = cell.active_reservation()?.clone();
        Some(Self {
            reservation,
            source_table_id: cell.table_id,
            source_time: time,
        })
    }

    /// Session anchored on the first slot `reservation_id` occupies on `table_id`
    pub fn from_schedule(schedule: &Schedule, table_id: i64, reservation_id: i64) -> Option<Self> {
        let start = *schedule.slots_of(table_id, reservation_id).first()?;
        Self::from_cell(schedule.cell(table_id, start)?, start)
    }

    /// Session for the reservation shown at (`table_id`, `time`)
    ///
    /// Any cell of a booking can be grabbed; the source is always the slot
    /// the booking starts at.
    pub fn pick(schedule: &Schedule, table_id: i64, time: TimeSlot) -> Option<Self> {
        let cell = schedule.cell(table_id, time)?;
        if !cell.is_draggable() {
            return None;
        }
        let reservation_id = cell.active_reservation()?.id;
        Self::from_schedule(schedule, table_id, reservation_id)
    }

    pub fn reservation_id(&self) -> i64 {
        self.reservation.id
    }

    pub fn guest_count(&self) -> i32 {
        self.reservation.guest_count
    }

    pub fn source(&self) -> DropTarget {
        DropTarget::new(self.source_table_id, self.source_time)
    }
}

/// Cell the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DropTarget {
    pub table_id: i64,
    pub time: TimeSlot,
}

impl DropTarget {
    pub fn new(table_id: i64, time: TimeSlot) -> Self {
        Self { table_id, time }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        session: DragSession,
        hover: Option<DropTarget>,
    },
    Committing {
        session: DragSession,
        target: DropTarget,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DragError {
    #[error("Cell has no active reservation to drag")]
    NotDraggable,

    #[error("Reservation {0} is still being saved")]
    Pending(i64),
}

pub struct DragTracker {
    state: DragState,
    pending: HashSet<i64>,
    cache: ScheduleCache,
    hold: Option<RefreshHold>,
}

impl DragTracker {
    pub fn new(cache: ScheduleCache) -> Self {
        Self {
            state: DragState::Idle,
            pending: HashSet::new(),
            cache,
            hold: None,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Session of the gesture in progress
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn hover_target(&self) -> Option<DropTarget> {
        match &self.state {
            DragState::Dragging { hover, .. } => *hover,
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn is_pending(&self, reservation_id: i64) -> bool {
        self.pending.contains(&reservation_id)
    }

    /// Pick up the reservation shown at (`table_id`, `time`)
    pub fn start(&mut self, schedule: &Schedule, table_id: i64, time: TimeSlot) -> Result<DragSession, DragError> {
        let session = DragSession::pick(schedule, table_id, time).ok_or(DragError::NotDraggable)?;
        if self.is_pending(session.reservation_id()) {
            return Err(DragError::Pending(session.reservation_id()));
        }
        tracing::debug!(
            reservation_id = session.reservation_id(),
            table_id,
            from = %session.source_time,
            "Drag started"
        );
        if self.hold.is_none() {
            self.hold = Some(self.cache.hold_refresh());
        }
        self.state = DragState::Dragging {
            session: session.clone(),
            hover: None,
        };
        Ok(session)
    }

    pub fn hover(&mut self, target: DropTarget) {
        if let DragState::Dragging { hover, .. } = &mut self.state {
            *hover = Some(target);
        }
    }

    /// Pointer left the board; ends the gesture like [`cancel`](Self::cancel)
    pub fn leave(&mut self) {
        if self.is_dragging() {
            tracing::debug!("Drag left the board");
            self.to_idle();
        }
    }

    /// Gesture aborted (escape, drop outside the board)
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            tracing::debug!("Drag canceled");
            self.to_idle();
        }
    }

    /// Finish the gesture on `target`
    ///
    /// Returns the session to commit when `verdict` accepts the drop; any
    /// other verdict ends the gesture without side effects.
    pub fn release(&mut self, target: DropTarget, verdict: &DropVerdict) -> Option<DragSession> {
        if !self.is_dragging() {
            return None;
        }
        let DragState::Dragging { session, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        self.hold = None;
        if !verdict.is_accepted() {
            return None;
        }
        self.pending.insert(session.reservation_id());
        self.state = DragState::Committing {
            session: session.clone(),
            target,
        };
        Some(session)
    }

    /// Lock a reservation for a mutation that bypasses the gesture
    /// (quick move, cancel). Returns false when it is already locked or is
    /// the one being dragged right now.
    pub fn lock(&mut self, reservation_id: i64) -> bool {
        if self.session().is_some_and(|s| s.reservation_id() == reservation_id) {
            return false;
        }
        self.pending.insert(reservation_id)
    }

    /// Release `reservation_id` once its request has finished
    pub fn settle(&mut self, reservation_id: i64) {
        self.pending.remove(&reservation_id);
        if let DragState::Committing { session, .. } = &self.state
            && session.reservation_id() == reservation_id
        {
            self.state = DragState::Idle;
        }
    }

    fn to_idle(&mut self) {
        self.state = DragState::Idle;
        self.hold = None;
    }
}
