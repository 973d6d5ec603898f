//! Schedule cache
//!
//! In-memory read cache of day schedules keyed by (date, timezone). It is the
//! only shared mutable state of the board: rendering reads it, the refresher
//! and the move coordinator write it. Writes are last-writer-wins per key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use parking_lot::RwLock;
use shared::models::Schedule;
use shared::timeslot::SlotGrid;
use tokio::sync::Notify;

use super::loader::{self, ScheduleError};
use crate::client::ReservationApi;
use crate::config::LoadStrategy;

/// Cache key: one service date in one timezone
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduleKey {
    pub date: NaiveDate,
    pub timezone: String,
}

impl ScheduleKey {
    pub fn new(date: NaiveDate, timezone: impl Into<String>) -> Self {
        Self {
            date,
            timezone: timezone.into(),
        }
    }
}

/// Other cached views that go stale when a reservation changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentView {
    /// Reservation list page for one date
    Reservations(NaiveDate),
    /// Dashboard counters
    DashboardCounts,
}

/// What a page sees for a key
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleState {
    Missing,
    Ready(Schedule),
    /// Invalidated; data stays visible until the refetch lands
    Stale(Schedule),
    /// Last load failed; page renders a retry affordance
    Failed {
        error: String,
        previous: Option<Schedule>,
    },
}

#[derive(Debug, Default)]
struct CacheEntry {
    data: Option<Schedule>,
    stale: bool,
    error: Option<String>,
    /// Bumped by every store and invalidation
    generation: u64,
    /// Bumped by optimistic patches and rollbacks only
    local_edits: u64,
    fetched_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<ScheduleKey, CacheEntry>,
    views: HashMap<DependentView, u64>,
    holds: usize,
    /// A refresh was skipped under a hold and runs once the last hold ends
    deferred: bool,
}

/// Shared schedule cache, cheap to clone
///
/// Invalidations wake whoever waits on [`refetch_signal`](Self::refetch_signal),
/// normally the [`ScheduleRefresher`](super::ScheduleRefresher).
#[derive(Debug, Clone, Default)]
pub struct ScheduleCache {
    inner: Arc<RwLock<CacheInner>>,
    refetch: Arc<Notify>,
}

/// Suppresses background refresh while alive
#[derive(Debug)]
pub struct RefreshHold {
    inner: Arc<RwLock<CacheInner>>,
    refetch: Arc<Notify>,
}

impl Drop for RefreshHold {
    fn drop(&mut self) {
        let resume = {
            let mut inner = self.inner.write();
            inner.holds = inner.holds.saturating_sub(1);
            inner.holds == 0 && std::mem::take(&mut inner.deferred)
        };
        if resume {
            tracing::debug!("Refresh hold released, running deferred refresh");
            self.refetch.notify_one();
        }
    }
}

impl ScheduleCache {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, key: &ScheduleKey) -> Option<Schedule> {
        self.inner
            .read()
            .entries
            .get(key)
            .and_then(|e| e.data.clone())
    }

    pub fn state(&self, key: &ScheduleKey) -> ScheduleState {
        let inner = self.inner.read();
        let Some(entry) = inner.entries.get(key) else {
            return ScheduleState::Missing;
        };
        match (&entry.error, &entry.data) {
            (Some(error), previous) => ScheduleState::Failed {
                error: error.clone(),
                previous: previous.clone(),
            },
            (None, Some(data)) if entry.stale => ScheduleState::Stale(data.clone()),
            (None, Some(data)) => ScheduleState::Ready(data.clone()),
            (None, None) => ScheduleState::Missing,
        }
    }

    pub fn generation(&self, key: &ScheduleKey) -> u64 {
        self.inner
            .read()
            .entries
            .get(key)
            .map(|e| e.generation)
            .unwrap_or(0)
    }

    pub fn view_generation(&self, view: DependentView) -> u64 {
        self.inner.read().views.get(&view).copied().unwrap_or(0)
    }

    /// Missing, stale or failed entries want a fetch
    pub fn needs_refresh(&self, key: &ScheduleKey) -> bool {
        !matches!(self.state(key), ScheduleState::Ready(_))
    }

    pub fn fetched_at(&self, key: &ScheduleKey) -> Option<Instant> {
        self.inner.read().entries.get(key).and_then(|e| e.fetched_at)
    }

    pub fn keys(&self) -> Vec<ScheduleKey> {
        self.inner.read().entries.keys().cloned().collect()
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Fetch the schedule for `key` and store it
    ///
    /// A result that raced with an optimistic patch on the same key is
    /// returned but not stored, so an in-flight move is not overwritten.
    pub async fn load<A: ReservationApi + ?Sized>(
        &self,
        api: &A,
        grid: &SlotGrid,
        key: &ScheduleKey,
        strategy: LoadStrategy,
    ) -> Result<Schedule, ScheduleError> {
        let edits_before = self.local_edits(key);
        match loader::fetch_schedule(api, grid, key, strategy).await {
            Ok(schedule) => {
                if self.local_edits(key) == edits_before {
                    self.store(key.clone(), schedule.clone());
                } else {
                    tracing::debug!(date = %key.date, "Discarding schedule fetched during a local edit");
                }
                Ok(schedule)
            }
            Err(e) => {
                self.record_failure(key, e.to_string());
                Err(e)
            }
        }
    }

    fn local_edits(&self, key: &ScheduleKey) -> u64 {
        self.inner
            .read()
            .entries
            .get(key)
            .map(|e| e.local_edits)
            .unwrap_or(0)
    }

    /// Replace the entry with freshly fetched data
    pub fn store(&self, key: ScheduleKey, schedule: Schedule) {
        let mut inner = self.inner.write();
        let entry = inner.entries.entry(key).or_default();
        entry.data = Some(schedule);
        entry.stale = false;
        entry.error = None;
        entry.generation += 1;
        entry.fetched_at = Some(Instant::now());
    }

    pub fn record_failure(&self, key: &ScheduleKey, error: String) {
        let mut inner = self.inner.write();
        let entry = inner.entries.entry(key.clone()).or_default();
        entry.error = Some(error);
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Mark `key` stale and ask for a refetch
    pub fn invalidate(&self, key: &ScheduleKey) {
        {
            let mut inner = self.inner.write();
            if let Some(entry) = inner.entries.get_mut(key) {
                entry.stale = true;
                entry.generation += 1;
            }
        }
        self.refetch.notify_one();
    }

    /// Mark every timezone variant of `date` stale and ask for a refetch
    pub fn invalidate_date(&self, date: NaiveDate) {
        {
            let mut inner = self.inner.write();
            for (key, entry) in inner.entries.iter_mut() {
                if key.date == date {
                    entry.stale = true;
                    entry.generation += 1;
                }
            }
        }
        self.refetch.notify_one();
    }

    /// Signal raised by invalidations and by a deferred refresh becoming due
    pub fn refetch_signal(&self) -> Arc<Notify> {
        self.refetch.clone()
    }

    pub fn invalidate_view(&self, view: DependentView) {
        *self.inner.write().views.entry(view).or_insert(0) += 1;
    }

    // =========================================================================
    // Optimistic edits
    // =========================================================================

    /// Apply `mutate` in place and return the value it replaced
    ///
    /// Returns `None` without calling `mutate` when nothing is cached.
    pub fn patch<F>(&self, key: &ScheduleKey, mutate: F) -> Option<Schedule>
    where
        F: FnOnce(&mut Schedule),
    {
        let mut inner = self.inner.write();
        let entry = inner.entries.get_mut(key)?;
        let data = entry.data.as_mut()?;
        let previous = data.clone();
        mutate(data);
        entry.local_edits += 1;
        Some(previous)
    }

    /// Overwrite the entry with `snapshot` (rollback)
    pub fn restore(&self, key: &ScheduleKey, snapshot: Schedule) {
        let mut inner = self.inner.write();
        let entry = inner.entries.entry(key.clone()).or_default();
        entry.data = Some(snapshot);
        entry.local_edits += 1;
    }

    /// Undo one optimistic patch
    ///
    /// When nothing touched the entry since `patched` was written, the
    /// snapshot is restored as a whole. Otherwise only the cells this patch
    /// changed are reverted, leaving concurrent edits in place.
    pub fn rollback(&self, key: &ScheduleKey, snapshot: Schedule, patched: &Schedule) {
        let mut inner = self.inner.write();
        let entry = inner.entries.entry(key.clone()).or_default();
        match entry.data.as_mut() {
            Some(current) if *current != *patched => {
                let touched = snapshot.diff_cells(patched);
                current.copy_cells_from(&snapshot, &touched);
            }
            Some(current) => *current = snapshot,
            None => entry.data = Some(snapshot),
        }
        entry.local_edits += 1;
    }

    // =========================================================================
    // Refresh suppression
    // =========================================================================

    /// Suppress background refresh until the returned hold is dropped
    pub fn hold_refresh(&self) -> RefreshHold {
        self.inner.write().holds += 1;
        RefreshHold {
            inner: self.inner.clone(),
            refetch: self.refetch.clone(),
        }
    }

    /// Claim a background refresh
    ///
    /// Returns false while a hold is active; the refresh is then remembered
    /// and signalled again when the last hold is dropped.
    pub fn begin_refresh(&self) -> bool {
        let mut inner = self.inner.write();
        if inner.holds > 0 {
            inner.deferred = true;
            return false;
        }
        true
    }

    pub fn refresh_suppressed(&self) -> bool {
        self.inner.read().holds > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ScheduleRow, TableCell};
    use shared::timeslot::TimeSlot;

    fn key() -> ScheduleKey {
        ScheduleKey::new(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), "Europe/Belgrade")
    }

    fn schedule() -> Schedule {
        Schedule::new(
            key().date,
            "Europe/Belgrade",
            vec![ScheduleRow::new(
                TimeSlot::at(18),
                vec![TableCell::available(1, "T1", 2, 6)],
            )],
        )
    }

    #[test]
    fn test_state_transitions() {
        let cache = ScheduleCache::new();
        assert_eq!(cache.state(&key()), ScheduleState::Missing);
        assert!(cache.needs_refresh(&key()));

        cache.store(key(), schedule());
        assert_eq!(cache.state(&key()), ScheduleState::Ready(schedule()));
        assert!(!cache.needs_refresh(&key()));
        assert!(cache.fetched_at(&key()).is_some());

        cache.invalidate(&key());
        assert_eq!(cache.state(&key()), ScheduleState::Stale(schedule()));
        assert!(cache.needs_refresh(&key()));

        cache.record_failure(&key(), "boom".into());
        assert_eq!(
            cache.state(&key()),
            ScheduleState::Failed {
                error: "boom".into(),
                previous: Some(schedule()),
            }
        );

        cache.store(key(), schedule());
        assert_eq!(cache.state(&key()), ScheduleState::Ready(schedule()));
    }

    #[test]
    fn test_generation_bumps() {
        let cache = ScheduleCache::new();
        assert_eq!(cache.generation(&key()), 0);
        cache.store(key(), schedule());
        assert_eq!(cache.generation(&key()), 1);
        cache.invalidate(&key());
        assert_eq!(cache.generation(&key()), 2);
        cache.invalidate_date(key().date);
        assert_eq!(cache.generation(&key()), 3);
    }

    #[test]
    fn test_patch_returns_previous_and_restore_overwrites() {
        let cache = ScheduleCache::new();
        assert!(cache.patch(&key(), |_| panic!("no data cached")).is_none());

        cache.store(key(), schedule());
        let snapshot = cache
            .patch(&key(), |s| s.rows[0].tables[0].status = shared::models::TableStatus::Maintenance)
            .unwrap();
        assert_eq!(snapshot, schedule());
        assert_ne!(cache.get(&key()).unwrap(), schedule());

        cache.restore(&key(), snapshot);
        assert_eq!(cache.get(&key()).unwrap(), schedule());
    }

    #[test]
    fn test_rollback_keeps_concurrent_edit() {
        let cache = ScheduleCache::new();
        let mut base = schedule();
        base.rows[0].tables.push(TableCell::available(2, "T2", 2, 4));
        cache.store(key(), base.clone());

        let mut first = None;
        let snapshot = cache
            .patch(&key(), |s| {
                s.cell_mut(1, TimeSlot::at(18)).unwrap().status =
                    shared::models::TableStatus::Maintenance;
                first = Some(s.clone());
            })
            .unwrap();
        cache.patch(&key(), |s| {
            s.cell_mut(2, TimeSlot::at(18)).unwrap().status = shared::models::TableStatus::Unavailable;
        });

        cache.rollback(&key(), snapshot, &first.unwrap());
        let current = cache.get(&key()).unwrap();
        assert_eq!(current.cell(1, TimeSlot::at(18)), base.cell(1, TimeSlot::at(18)));
        assert_eq!(
            current.cell(2, TimeSlot::at(18)).unwrap().status,
            shared::models::TableStatus::Unavailable
        );
    }

    #[test]
    fn test_rollback_without_concurrent_edit_is_exact() {
        let cache = ScheduleCache::new();
        cache.store(key(), schedule());
        let mut patched = None;
        let snapshot = cache
            .patch(&key(), |s| {
                s.rows[0].tables.clear();
                patched = Some(s.clone());
            })
            .unwrap();
        cache.rollback(&key(), snapshot, &patched.unwrap());
        assert_eq!(cache.get(&key()).unwrap(), schedule());
    }

    #[test]
    fn test_refresh_hold_is_counted() {
        let cache = ScheduleCache::new();
        assert!(!cache.refresh_suppressed());
        let a = cache.hold_refresh();
        let b = cache.hold_refresh();
        assert!(cache.refresh_suppressed());
        drop(a);
        assert!(cache.refresh_suppressed());
        drop(b);
        assert!(!cache.refresh_suppressed());
    }

    #[tokio::test]
    async fn test_invalidate_signals_refetch() {
        let cache = ScheduleCache::new();
        let signal = cache.refetch_signal();
        cache.store(key(), schedule());
        cache.invalidate(&key());
        tokio::time::timeout(std::time::Duration::from_secs(1), signal.notified())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refresh_deferred_until_hold_released() {
        let cache = ScheduleCache::new();
        let signal = cache.refetch_signal();
        let hold = cache.hold_refresh();
        assert!(!cache.begin_refresh());

        let waiter = tokio::spawn(async move { signal.notified().await });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(hold);
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(cache.begin_refresh());
    }

    #[test]
    fn test_dependent_views() {
        let cache = ScheduleCache::new();
        let view = DependentView::Reservations(key().date);
        assert_eq!(cache.view_generation(view), 0);
        cache.invalidate_view(view);
        cache.invalidate_view(DependentView::DashboardCounts);
        assert_eq!(cache.view_generation(view), 1);
        assert_eq!(cache.view_generation(DependentView::DashboardCounts), 1);
    }
}
