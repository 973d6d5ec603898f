//! Background schedule refresh
//!
//! Refetches the watched schedule on a fixed interval, whenever a page asks
//! for it (mount, window refocus) and whenever the cache is invalidated. A
//! fetch due while a drag or an optimistic mutation holds the cache runs as
//! soon as the hold is released.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use shared::timeslot::SlotGrid;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::cache::{ScheduleCache, ScheduleKey};
use crate::client::ReservationApi;
use crate::config::LoadStrategy;

/// Cloneable handle pages use to steer a running [`ScheduleRefresher`]
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
    key: Arc<RwLock<ScheduleKey>>,
}

impl RefreshHandle {
    /// Refetch as soon as possible (page mount, window refocus)
    pub fn refresh_now(&self) {
        self.notify.notify_one();
    }

    /// Switch to another date/timezone and fetch it right away
    pub fn watch(&self, key: ScheduleKey) {
        *self.key.write() = key;
        self.notify.notify_one();
    }

    pub fn current(&self) -> ScheduleKey {
        self.key.read().clone()
    }
}

pub struct ScheduleRefresher<A: ?Sized> {
    api: Arc<A>,
    cache: ScheduleCache,
    grid: SlotGrid,
    strategy: LoadStrategy,
    interval: Duration,
    handle: RefreshHandle,
    shutdown: CancellationToken,
}

impl<A: ReservationApi + ?Sized> ScheduleRefresher<A> {
    pub fn new(
        api: Arc<A>,
        cache: ScheduleCache,
        grid: SlotGrid,
        key: ScheduleKey,
        strategy: LoadStrategy,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            handle: RefreshHandle {
                notify: cache.refetch_signal(),
                key: Arc::new(RwLock::new(key)),
            },
            api,
            cache,
            grid,
            strategy,
            interval,
            shutdown,
        }
    }

    pub fn handle(&self) -> RefreshHandle {
        self.handle.clone()
    }

    /// Main loop: initial load, then interval ticks and on-demand refreshes
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Schedule refresher started");

        self.refresh_once().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.refresh_once().await;
                }
                _ = self.handle.notify.notified() => {
                    tracing::debug!("Refresh requested");
                    self.refresh_once().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Schedule refresher received shutdown signal");
                    return;
                }
            }
        }
    }

    /// Fetch the watched key unless refresh is held; returns whether it ran
    pub async fn refresh_once(&self) -> bool {
        if !self.cache.begin_refresh() {
            tracing::debug!("Drag in progress, deferring schedule refresh");
            return false;
        }
        let key = self.handle.current();
        match self
            .cache
            .load(self.api.as_ref(), &self.grid, &key, self.strategy)
            .await
        {
            Ok(_) => {}
            Err(e) => tracing::warn!(date = %key.date, error = %e, "Schedule refresh failed"),
        }
        true
    }
}
