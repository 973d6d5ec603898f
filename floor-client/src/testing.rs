//! In-memory [`ReservationApi`] for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use shared::models::{
    Reservation, ReservationCancel, ReservationMove, ReservationStatus, ReservationSummary,
    RestaurantProfile, ScheduleRow, TableCell,
};
use shared::timeslot::{OperatingHours, SlotGrid, TimeSlot};
use tokio::sync::Notify;

use crate::client::ReservationApi;
use crate::{ClientError, ClientResult};

/// Scripted answer for a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scripted {
    #[default]
    Ok,
    Conflict,
    Validation,
    Network,
}

impl Scripted {
    fn into_error(self) -> Option<ClientError> {
        match self {
            Scripted::Ok => None,
            Scripted::Conflict => Some(ClientError::Conflict(String::new())),
            Scripted::Validation => Some(ClientError::Validation("Too many guests".into())),
            Scripted::Network => Some(ClientError::Internal("connection reset".into())),
        }
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub cells: Mutex<Vec<TableCell>>,
    pub slot_cells: Mutex<HashMap<TimeSlot, Vec<TableCell>>>,
    pub failing: Mutex<HashSet<TimeSlot>>,
    pub requested: Mutex<Vec<TimeSlot>>,
    pub scripted: Mutex<HashMap<i64, Scripted>>,
    pub gates: Mutex<HashMap<i64, Arc<Notify>>>,
    pub moves: Mutex<Vec<(i64, ReservationMove)>>,
    pub cancels: Mutex<Vec<(i64, ReservationCancel)>>,
}

impl FakeApi {
    pub fn with_cells(cells: Vec<TableCell>) -> Self {
        let api = Self::default();
        *api.cells.lock() = cells;
        api
    }

    pub fn script(&self, reservation_id: i64, answer: Scripted) {
        self.scripted.lock().insert(reservation_id, answer);
    }

    /// Hold the answer for `reservation_id` until the returned gate is notified
    pub fn gate(&self, reservation_id: i64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(reservation_id, gate.clone());
        gate
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().len()
    }

    async fn answer(&self, id: i64) -> Option<ClientError> {
        let gate = self.gates.lock().get(&id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let answer = self.scripted.lock().get(&id).copied().unwrap_or_default();
        answer.into_error()
    }
}

#[async_trait]
impl ReservationApi for FakeApi {
    async fn restaurant_profile(&self) -> ClientResult<RestaurantProfile> {
        Err(ClientError::NotFound("profile".into()))
    }

    async fn slot_availability(
        &self,
        _date: NaiveDate,
        time: TimeSlot,
        _timezone: &str,
    ) -> ClientResult<Vec<TableCell>> {
        self.requested.lock().push(time);
        if self.failing.lock().contains(&time) {
            return Err(ClientError::Internal("boom".into()));
        }
        if let Some(cells) = self.slot_cells.lock().get(&time) {
            return Ok(cells.clone());
        }
        Ok(self.cells.lock().clone())
    }

    async fn day_schedule(&self, _date: NaiveDate, _timezone: &str) -> ClientResult<Vec<ScheduleRow>> {
        Ok(vec![ScheduleRow::new(TimeSlot::at(19), self.cells.lock().clone())])
    }

    async fn move_reservation(&self, id: i64, body: &ReservationMove) -> ClientResult<Reservation> {
        self.moves.lock().push((id, body.clone()));
        if let Some(e) = self.answer(id).await {
            return Err(e);
        }
        Ok(Reservation {
            id,
            table_id: body.table_id,
            date: body.date,
            time: body.time,
            duration_minutes: None,
            guest_name: String::new(),
            guest_count: 0,
            phone: None,
            email: None,
            status: ReservationStatus::Confirmed,
        })
    }

    async fn cancel_reservation(&self, id: i64, body: &ReservationCancel) -> ClientResult<Reservation> {
        self.cancels.lock().push((id, body.clone()));
        if let Some(e) = self.answer(id).await {
            return Err(e);
        }
        Ok(Reservation {
            id,
            table_id: 0,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: TimeSlot::at(0),
            duration_minutes: None,
            guest_name: String::new(),
            guest_count: 0,
            phone: None,
            email: None,
            status: ReservationStatus::Canceled,
        })
    }
}

pub fn belgrade_grid(opening: &str, closing: &str) -> SlotGrid {
    SlotGrid::build(
        OperatingHours::parse(opening, closing).unwrap(),
        120,
        chrono_tz::Europe::Belgrade,
    )
}

pub fn summary(id: i64, guest_name: &str, guest_count: i32) -> ReservationSummary {
    ReservationSummary {
        id,
        guest_name: guest_name.to_string(),
        guest_count,
        phone: None,
        email: None,
        status: ReservationStatus::Confirmed,
        duration_minutes: None,
    }
}
