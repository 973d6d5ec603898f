//! Restaurant Profile Model

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::dining_table::{MAX_TABLE_CAPACITY, MIN_TABLE_CAPACITY};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::timeslot::{self, DEFAULT_AVG_DURATION_MINUTES, OperatingHours, SlotGrid};

/// Restaurant profile (`GET /api/restaurants/profile`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantProfile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// 营业开始时间 (HH:MM)
    pub opening_time: String,
    /// 营业结束时间 (HH:MM)，早于开始时间表示跨午夜营业
    pub closing_time: String,
    /// IANA timezone name
    pub timezone: String,
    #[serde(default = "default_avg_duration")]
    pub avg_reservation_duration: u32,
    #[serde(default = "default_min_guests")]
    pub min_guests: i32,
    #[serde(default = "default_max_guests")]
    pub max_guests: i32,
}

fn default_avg_duration() -> u32 {
    DEFAULT_AVG_DURATION_MINUTES
}

fn default_min_guests() -> i32 {
    MIN_TABLE_CAPACITY
}

fn default_max_guests() -> i32 {
    MAX_TABLE_CAPACITY
}

impl RestaurantProfile {
    pub fn operating_hours(&self) -> AppResult<OperatingHours> {
        OperatingHours::parse(&self.opening_time, &self.closing_time).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidFormat, e.to_string())
                .with_detail("field", "openingTime/closingTime")
        })
    }

    pub fn tz(&self) -> AppResult<Tz> {
        timeslot::parse_timezone(&self.timezone).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidFormat, e.to_string())
                .with_detail("field", "timezone")
        })
    }

    /// Check guest bounds against the canonical capacity limits
    pub fn validate(&self) -> AppResult<()> {
        if self.min_guests < MIN_TABLE_CAPACITY
            || self.max_guests > MAX_TABLE_CAPACITY
            || self.min_guests > self.max_guests
        {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!(
                    "Guest bounds [{}, {}] must lie within [{}, {}]",
                    self.min_guests, self.max_guests, MIN_TABLE_CAPACITY, MAX_TABLE_CAPACITY
                ),
            ));
        }
        self.operating_hours()?;
        self.tz()?;
        Ok(())
    }

    /// Slot grid for one service day of this restaurant
    pub fn slot_grid(&self) -> AppResult<SlotGrid> {
        self.validate()?;
        Ok(SlotGrid::build(
            self.operating_hours()?,
            self.avg_reservation_duration,
            self.tz()?,
        ))
    }
}
