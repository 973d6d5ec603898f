//! Optimistic schedule edits
//!
//! Cache-side effect of a mutation, applied before the server answers and
//! rolled back if it refuses.

use std::future::Future;

use shared::models::Schedule;
use shared::timeslot::SlotGrid;

use super::drag::{DragSession, DropTarget};
use crate::ClientResult;
use crate::schedule::{ScheduleCache, ScheduleKey};

/// Move the reservation of `session` onto `target`
///
/// The reservation is removed from every slot it held on the source table
/// and attached to each slot of the destination window.
pub fn apply_move(schedule: &mut Schedule, grid: &SlotGrid, session: &DragSession, target: DropTarget) {
    let reservation_id = session.reservation_id();
    for slot in schedule.slots_of(session.source_table_id, reservation_id) {
        if let Some(cell) = schedule.cell_mut(session.source_table_id, slot) {
            cell.clear();
        }
    }

    let span = grid.span_for(session.reservation.duration_minutes);
    let Ok(window) = grid.window(target.time, span) else {
        return;
    };
    for &slot in window {
        if let Some(cell) = schedule.cell_mut(target.table_id, slot) {
            cell.book(session.reservation.clone());
        }
    }
}

/// Free every slot `reservation_id` holds on `table_id`
pub fn apply_cancel(schedule: &mut Schedule, table_id: i64, reservation_id: i64) {
    for slot in schedule.slots_of(table_id, reservation_id) {
        if let Some(cell) = schedule.cell_mut(table_id, slot) {
            cell.clear();
        }
    }
}

/// Patch the cache, await `request`, and undo the patch if it fails
///
/// Nothing is patched when `key` is not cached; the request still runs.
pub async fn run_optimistic<T, P, F>(
    cache: &ScheduleCache,
    key: &ScheduleKey,
    patch: P,
    request: F,
) -> ClientResult<T>
where
    P: FnOnce(&mut Schedule),
    F: Future<Output = ClientResult<T>>,
{
    let mut patched = None;
    let snapshot = cache.patch(key, |schedule| {
        patch(schedule);
        patched = Some(schedule.clone());
    });

    let result = request.await;
    if result.is_err()
        && let (Some(snapshot), Some(patched)) = (snapshot, patched)
    {
        tracing::debug!(date = %key.date, "Rolling back optimistic edit");
        cache.rollback(key, snapshot, &patched);
    }
    result
}
