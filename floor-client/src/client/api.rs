//! Reservation API
//!
//! Typed endpoints the schedule consumes. Every response is wrapped in the
//! unified `{code, message, data, details}` envelope.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::ApiResponse;
use shared::models::{
    Reservation, ReservationCancel, ReservationMove, RestaurantProfile, ScheduleRow, TableCell,
};
use shared::timeslot::TimeSlot;

use super::http::HttpClient;
use crate::{ClientError, ClientResult};

const PROFILE_PATH: &str = "api/restaurants/profile";
const AVAILABILITY_PATH: &str = "api/tables/availability";
const SCHEDULE_PATH: &str = "api/tables/availability/schedule";

/// Backend operations used by the schedule and the move coordinator
#[async_trait]
pub trait ReservationApi: Send + Sync {
    /// Operating hours, timezone, average duration, guest bounds
    async fn restaurant_profile(&self) -> ClientResult<RestaurantProfile>;

    /// Table cells for a single time slot
    async fn slot_availability(
        &self,
        date: NaiveDate,
        time: TimeSlot,
        timezone: &str,
    ) -> ClientResult<Vec<TableCell>>;

    /// Whole-day schedule in one request
    async fn day_schedule(&self, date: NaiveDate, timezone: &str)
    -> ClientResult<Vec<ScheduleRow>>;

    async fn move_reservation(&self, id: i64, body: &ReservationMove)
    -> ClientResult<Reservation>;

    async fn cancel_reservation(
        &self,
        id: i64,
        body: &ReservationCancel,
    ) -> ClientResult<Reservation>;
}

/// [`ReservationApi`] over an [`HttpClient`]
#[derive(Debug, Clone)]
pub struct FloorApi<H> {
    http: H,
}

impl<H: HttpClient> FloorApi<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }
}

fn unwrap_envelope<T>(response: ApiResponse<T>, what: &str) -> ClientResult<T> {
    if !response.is_success() {
        return Err(response.to_app_error().into());
    }
    response
        .data
        .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {} data", what)))
}

#[async_trait]
impl<H: HttpClient> ReservationApi for FloorApi<H> {
    async fn restaurant_profile(&self) -> ClientResult<RestaurantProfile> {
        let resp: ApiResponse<RestaurantProfile> = self.http.get(PROFILE_PATH, &[]).await?;
        unwrap_envelope(resp, "profile")
    }

    async fn slot_availability(
        &self,
        date: NaiveDate,
        time: TimeSlot,
        timezone: &str,
    ) -> ClientResult<Vec<TableCell>> {
        let date = date.format("%Y-%m-%d").to_string();
        let time = time.to_string();
        tracing::trace!(%date, %time, "Fetching slot availability");
        let resp: ApiResponse<Vec<TableCell>> = self
            .http
            .get(
                AVAILABILITY_PATH,
                &[("date", date.as_str()), ("time", time.as_str()), ("timezone", timezone)],
            )
            .await?;
        unwrap_envelope(resp, "availability")
    }

    async fn day_schedule(
        &self,
        date: NaiveDate,
        timezone: &str,
    ) -> ClientResult<Vec<ScheduleRow>> {
        let date = date.format("%Y-%m-%d").to_string();
        let resp: ApiResponse<Vec<ScheduleRow>> = self
            .http
            .get(SCHEDULE_PATH, &[("date", date.as_str()), ("timezone", timezone)])
            .await?;
        unwrap_envelope(resp, "schedule")
    }

    async fn move_reservation(
        &self,
        id: i64,
        body: &ReservationMove,
    ) -> ClientResult<Reservation> {
        tracing::debug!(reservation_id = id, table_id = body.table_id, time = %body.time, "PATCH reservation move");
        let resp: ApiResponse<Reservation> = self
            .http
            .patch(&format!("api/reservations/{}", id), body)
            .await?;
        unwrap_envelope(resp, "reservation")
    }

    async fn cancel_reservation(
        &self,
        id: i64,
        body: &ReservationCancel,
    ) -> ClientResult<Reservation> {
        tracing::debug!(reservation_id = id, "PATCH reservation cancel");
        let resp: ApiResponse<Reservation> = self
            .http
            .patch(&format!("api/reservations/{}", id), body)
            .await?;
        unwrap_envelope(resp, "reservation")
    }
}
