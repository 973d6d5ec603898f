//! Schedule fetching
//!
//! Builds a [`Schedule`] from the availability endpoints. Per-slot loading
//! issues one request per slot concurrently; aggregate loading asks for the
//! whole day at once.

use futures::future::join_all;
use shared::error::AppError;
use shared::models::{RestaurantProfile, Schedule, ScheduleRow};
use shared::timeslot::{SlotGrid, TimeSlot};
use thiserror::Error;

use super::cache::ScheduleKey;
use crate::ClientError;
use crate::client::ReservationApi;
use crate::config::LoadStrategy;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A slot request failed on a standard (same-day) grid
    #[error("Failed to load slot {slot}: {source}")]
    SlotFetch {
        slot: TimeSlot,
        #[source]
        source: ClientError,
    },

    #[error("Failed to load day schedule: {0}")]
    Aggregate(#[source] ClientError),

    #[error("Slot grid is empty")]
    EmptyGrid,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to fetch restaurant profile: {0}")]
    Fetch(#[from] ClientError),

    #[error("Invalid restaurant profile: {0}")]
    Invalid(#[from] AppError),
}

/// Fetch the profile and derive the service-day grid from it
pub async fn fetch_grid<A: ReservationApi + ?Sized>(
    api: &A,
) -> Result<(RestaurantProfile, SlotGrid), ProfileError> {
    let profile = api.restaurant_profile().await?;
    let grid = profile.slot_grid()?;
    tracing::info!(
        restaurant = %profile.name,
        opening = %profile.opening_time,
        closing = %profile.closing_time,
        slots = grid.len(),
        overnight = grid.is_overnight(),
        "Slot grid ready"
    );
    Ok((profile, grid))
}

/// Fetch the schedule for `key` with the given strategy
pub async fn fetch_schedule<A: ReservationApi + ?Sized>(
    api: &A,
    grid: &SlotGrid,
    key: &ScheduleKey,
    strategy: LoadStrategy,
) -> Result<Schedule, ScheduleError> {
    if grid.is_empty() {
        return Err(ScheduleError::EmptyGrid);
    }

    let rows = match strategy {
        LoadStrategy::PerSlot => fetch_per_slot(api, grid, key).await?,
        LoadStrategy::Aggregate => fetch_aggregate(api, grid, key).await?,
    };

    let mut schedule = Schedule::new(key.date, key.timezone.clone(), rows);
    schedule.sort_tables();
    schedule.normalize();
    tracing::debug!(date = %key.date, rows = schedule.rows.len(), "Schedule loaded");
    Ok(schedule)
}

async fn fetch_per_slot<A: ReservationApi + ?Sized>(
    api: &A,
    grid: &SlotGrid,
    key: &ScheduleKey,
) -> Result<Vec<ScheduleRow>, ScheduleError> {
    // Overnight slots past midnight are still requested with the service date
    let requests = grid
        .slots()
        .iter()
        .map(|&slot| async move { (slot, api.slot_availability(key.date, slot, &key.timezone).await) });
    let results = join_all(requests).await;

    let mut rows = Vec::with_capacity(results.len());
    for (slot, result) in results {
        match result {
            Ok(tables) => rows.push(ScheduleRow::new(slot, tables)),
            Err(e) if grid.is_overnight() => {
                tracing::warn!(date = %key.date, %slot, error = %e, "Slot fetch failed, showing empty row");
                rows.push(ScheduleRow::empty(slot));
            }
            Err(e) => return Err(ScheduleError::SlotFetch { slot, source: e }),
        }
    }
    Ok(rows)
}

async fn fetch_aggregate<A: ReservationApi + ?Sized>(
    api: &A,
    grid: &SlotGrid,
    key: &ScheduleKey,
) -> Result<Vec<ScheduleRow>, ScheduleError> {
    let mut fetched = api
        .day_schedule(key.date, &key.timezone)
        .await
        .map_err(ScheduleError::Aggregate)?;

    // Lay rows out in grid order; slots the server skipped become empty
    let rows = grid
        .slots()
        .iter()
        .map(|&slot| match fetched.iter().position(|r| r.time == slot) {
            Some(idx) => fetched.swap_remove(idx),
            None => ScheduleRow::empty(slot),
        })
        .collect();
    Ok(rows)
}
