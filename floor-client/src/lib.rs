//! Floor Client - reservation board client for the restaurant API
//!
//! Loads the table-by-timeslot schedule, validates drag-and-drop moves
//! against it, and applies them optimistically with rollback on failure.

pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod notify;
pub mod schedule;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, LoadStrategy};
pub use error::{ClientError, ClientResult, FailureKind};

pub use client::{FloorApi, HttpClient, NetworkHttpClient, ReservationApi};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};

pub use board::{
    Affordance, DragError, DragSession, DragTracker, DropRejection, DropTarget, DropVerdict,
    MoveCoordinator, MutationOutcome,
};
pub use schedule::{
    DependentView, ProfileError, RefreshHandle, ScheduleCache, ScheduleError, ScheduleKey,
    ScheduleRefresher, ScheduleState,
};

// Re-export shared types for convenience
pub use shared::models::{Reservation, Schedule, ScheduleRow, TableCell};
pub use shared::timeslot::{SlotGrid, TimeSlot};
