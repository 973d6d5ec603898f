//! Move coordinator
//!
//! Turns a validated drop, a quick move or a cancel into an optimistic cache
//! edit plus a PATCH request, then either keeps the edit and invalidates the
//! dependent views, or rolls it back and tells the user why.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::models::{Reservation, ReservationCancel, ReservationMove};
use shared::timeslot::{SlotGrid, TimeSlot};

use super::drag::{DragError, DragSession, DragTracker, DropTarget};
use super::optimistic::{apply_cancel, apply_move, run_optimistic};
use super::validator::{Affordance, DropRejection, DropVerdict, validate};
use crate::client::ReservationApi;
use crate::error::{ClientResult, FailureKind};
use crate::notify::{Notification, Notifier};
use crate::schedule::{DependentView, ScheduleCache, ScheduleKey};

/// What happened to a requested mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Server accepted; the optimistic edit stays
    Committed(Reservation),
    /// Server refused or was unreachable; the edit was undone
    RolledBack { kind: FailureKind, message: String },
    /// Refused locally, no request sent
    Rejected(DropRejection),
    /// Nothing to act on (no gesture, nothing cached, already in flight)
    Skipped,
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, MutationOutcome::Committed(_))
    }
}

pub struct MoveCoordinator<A: ?Sized> {
    api: Arc<A>,
    cache: ScheduleCache,
    grid: SlotGrid,
    tracker: Arc<Mutex<DragTracker>>,
    notifier: Arc<dyn Notifier>,
}

impl<A: ?Sized> Clone for MoveCoordinator<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            cache: self.cache.clone(),
            grid: self.grid.clone(),
            tracker: self.tracker.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<A: ReservationApi + ?Sized> MoveCoordinator<A> {
    pub fn new(api: Arc<A>, cache: ScheduleCache, grid: SlotGrid, notifier: Arc<dyn Notifier>) -> Self {
        let tracker = Arc::new(Mutex::new(DragTracker::new(cache.clone())));
        Self {
            api,
            cache,
            grid,
            tracker,
            notifier,
        }
    }

    pub fn cache(&self) -> &ScheduleCache {
        &self.cache
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn tracker(&self) -> Arc<Mutex<DragTracker>> {
        self.tracker.clone()
    }

    // =========================================================================
    // Gesture
    // =========================================================================

    /// Pick up the reservation shown at (`table_id`, `time`)
    pub fn begin_drag(&self, key: &ScheduleKey, table_id: i64, time: TimeSlot) -> Result<DragSession, DragError> {
        let schedule = self.cache.get(key).ok_or(DragError::NotDraggable)?;
        self.tracker.lock().start(&schedule, table_id, time)
    }

    /// Track the hovered cell and return its styling
    pub fn hover(&self, key: &ScheduleKey, target: DropTarget) -> Affordance {
        let mut tracker = self.tracker.lock();
        let Some(session) = tracker.session().cloned() else {
            return Affordance::Reject;
        };
        tracker.hover(target);
        match self.cache.get(key) {
            Some(schedule) => validate(&schedule, &self.grid, &session, target).affordance(),
            None => Affordance::Reject,
        }
    }

    pub fn leave(&self) {
        self.tracker.lock().leave();
    }

    pub fn cancel_drag(&self) {
        self.tracker.lock().cancel();
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Commit the gesture in progress onto `target`
    pub async fn drop_reservation(&self, key: &ScheduleKey, target: DropTarget) -> MutationOutcome {
        let session = {
            let mut tracker = self.tracker.lock();
            let Some(session) = tracker.session().cloned() else {
                return MutationOutcome::Skipped;
            };
            let Some(schedule) = self.cache.get(key) else {
                tracker.cancel();
                return MutationOutcome::Skipped;
            };
            let verdict = validate(&schedule, &self.grid, &session, target);
            match tracker.release(target, &verdict) {
                Some(session) => session,
                None => return Self::rejected(verdict),
            }
        };
        self.commit_move(key, session, target).await
    }

    /// Shift a reservation by whole hours on its own table
    pub async fn quick_move(
        &self,
        key: &ScheduleKey,
        table_id: i64,
        reservation_id: i64,
        hours: i64,
    ) -> MutationOutcome {
        let Some(schedule) = self.cache.get(key) else {
            return MutationOutcome::Skipped;
        };
        let Some(session) = DragSession::from_schedule(&schedule, table_id, reservation_id) else {
            return MutationOutcome::Skipped;
        };
        let span = self.grid.span_for(session.reservation.duration_minutes);
        let steps = hours
            .checked_mul(60)
            .map(|minutes| minutes / i64::from(self.grid.slot_minutes()));
        let Some(time) = steps.and_then(|steps| self.grid.offset(session.source_time, steps)) else {
            return MutationOutcome::Rejected(DropRejection::PastClosing {
                start: session.source_time,
                span,
            });
        };
        let target = DropTarget::new(table_id, time);
        let verdict = validate(&schedule, &self.grid, &session, target);
        if let DropVerdict::Reject(rejection) = verdict {
            return MutationOutcome::Rejected(rejection);
        }
        if !self.tracker.lock().lock(reservation_id) {
            return MutationOutcome::Skipped;
        }
        self.commit_move(key, session, target).await
    }

    /// Cancel a reservation, freeing its slots right away
    pub async fn cancel_reservation(&self, key: &ScheduleKey, table_id: i64, reservation_id: i64) -> MutationOutcome {
        if !self.tracker.lock().lock(reservation_id) {
            return MutationOutcome::Skipped;
        }
        let _hold = self.cache.hold_refresh();
        let body = ReservationCancel::new(key.timezone.clone());
        tracing::info!(reservation_id, date = %key.date, "Canceling reservation");

        let result = run_optimistic(
            &self.cache,
            key,
            |schedule| apply_cancel(schedule, table_id, reservation_id),
            self.api.cancel_reservation(reservation_id, &body),
        )
        .await;
        let done = Notification::success("Reservation canceled", format!("Reservation #{} canceled", reservation_id));
        self.finish(key, reservation_id, result, done, "Cancel failed")
    }

    async fn commit_move(&self, key: &ScheduleKey, session: DragSession, target: DropTarget) -> MutationOutcome {
        let _hold = self.cache.hold_refresh();
        let reservation_id = session.reservation_id();
        let body = ReservationMove {
            table_id: target.table_id,
            time: target.time,
            date: key.date,
            timezone: key.timezone.clone(),
        };
        tracing::info!(
            reservation_id,
            from_table = session.source_table_id,
            from = %session.source_time,
            to_table = target.table_id,
            to = %target.time,
            "Moving reservation"
        );

        let grid = &self.grid;
        let result = run_optimistic(
            &self.cache,
            key,
            |schedule| apply_move(schedule, grid, &session, target),
            self.api.move_reservation(reservation_id, &body),
        )
        .await;
        let done = Notification::success(
            "Reservation moved",
            format!("{} moved to table {} at {}", session.reservation.guest_name, target.table_id, target.time),
        );
        self.finish(key, reservation_id, result, done, "Move failed")
    }

    fn finish(
        &self,
        key: &ScheduleKey,
        reservation_id: i64,
        result: ClientResult<Reservation>,
        success: Notification,
        failure_title: &str,
    ) -> MutationOutcome {
        self.tracker.lock().settle(reservation_id);
        match result {
            Ok(reservation) => {
                self.cache.invalidate_view(DependentView::Reservations(key.date));
                self.cache.invalidate_view(DependentView::DashboardCounts);
                self.cache.invalidate(key);
                self.notifier.notify(success);
                MutationOutcome::Committed(reservation)
            }
            Err(e) => {
                let kind = e.failure_kind();
                let message = e.user_message();
                tracing::warn!(reservation_id, ?kind, error = %e, "Reservation update rolled back");
                self.notifier.notify(Notification::error(failure_title, message.clone()));
                MutationOutcome::RolledBack { kind, message }
            }
        }
    }

    fn rejected(verdict: DropVerdict) -> MutationOutcome {
        match verdict.rejection() {
            Some(rejection) => {
                if !rejection.is_silent() {
                    tracing::debug!(%rejection, "Drop rejected");
                }
                MutationOutcome::Rejected(rejection)
            }
            None => MutationOutcome::Skipped,
        }
    }
}
