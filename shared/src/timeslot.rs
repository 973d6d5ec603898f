//! 营业时段 — time slots for the table schedule
//!
//! All slot arithmetic lives here. A service day is the ordered run of slots
//! from opening to closing; when closing is numerically earlier than opening
//! the run crosses midnight ("overnight operation") and slot order is the
//! service order, not the clock order.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Slot length in minutes
pub const SLOT_MINUTES: u32 = 60;

/// Average reservation duration used when the profile leaves it unset
pub const DEFAULT_AVG_DURATION_MINUTES: u32 = 120;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Time slot errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Slot {0} is outside opening hours")]
    UnknownSlot(TimeSlot),

    #[error("Window starting at {start} spanning {span} slot(s) runs past closing")]
    PastClosing { start: TimeSlot, span: usize },
}

/// A clock-time bucket within the service day, keyed as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    /// Slot at `hour:minute`, `None` when out of range
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Slot at `hour:00`, hours past 23 wrap around the clock
    pub fn at(hour: u32) -> Self {
        Self(NaiveTime::default()).add_minutes(i64::from(hour % 24) * 60)
    }

    /// Parse `HH:MM` or `HH:MM:SS`
    pub fn parse(value: &str) -> Result<Self, SlotError> {
        let value = value.trim();
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .map(|t| Self(t.with_second(0).unwrap_or(t)))
            .map_err(|_| SlotError::InvalidTime(value.to_string()))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Clock arithmetic, wrapping past midnight
    pub fn add_minutes(&self, minutes: i64) -> Self {
        let (time, _) = self.0.overflowing_add_signed(Duration::minutes(minutes));
        Self(time)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeSlot {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Opening and closing time of a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
}

impl OperatingHours {
    pub fn new(opening: NaiveTime, closing: NaiveTime) -> Self {
        Self { opening, closing }
    }

    /// Parse opening/closing strings (`HH:MM` or `HH:MM:SS`)
    pub fn parse(opening: &str, closing: &str) -> Result<Self, SlotError> {
        Ok(Self {
            opening: TimeSlot::parse(opening)?.time(),
            closing: TimeSlot::parse(closing)?.time(),
        })
    }

    /// Closing earlier than opening: hours cross midnight
    pub fn is_overnight(&self) -> bool {
        self.closing < self.opening
    }

    /// Identical opening and closing is read as round-the-clock service
    pub fn is_round_the_clock(&self) -> bool {
        self.closing == self.opening
    }

    /// Length of the service day in minutes
    pub fn service_minutes(&self) -> u32 {
        let open = self.opening.num_seconds_from_midnight() / 60;
        let close = self.closing.num_seconds_from_midnight() / 60;
        if close > open {
            close - open
        } else {
            close + MINUTES_PER_DAY - open
        }
    }
}

/// Ordered slots of one service day plus the arithmetic over them
#[derive(Debug, Clone, PartialEq)]
pub struct SlotGrid {
    slots: Vec<TimeSlot>,
    slot_minutes: u32,
    default_span: usize,
    overnight: bool,
    timezone: Tz,
}

impl SlotGrid {
    /// Generate the service-day slots for `hours`
    ///
    /// Slots start at opening and step by [`SLOT_MINUTES`]; a slot is kept only
    /// when it ends at or before closing. Overnight hours wrap past midnight,
    /// so 22:00–03:00 yields 22:00, 23:00, 00:00, 01:00, 02:00.
    pub fn build(hours: OperatingHours, avg_duration_minutes: u32, timezone: Tz) -> Self {
        let count = (hours.service_minutes() / SLOT_MINUTES) as usize;
        let opening = TimeSlot(hours.opening);
        let slots = (0..count)
            .map(|i| opening.add_minutes(i as i64 * SLOT_MINUTES as i64))
            .collect();

        Self {
            slots,
            slot_minutes: SLOT_MINUTES,
            default_span: span_for_minutes(avg_duration_minutes, SLOT_MINUTES),
            overnight: hours.is_overnight(),
            timezone,
        }
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn is_overnight(&self) -> bool {
        self.overnight
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Span (in slots) of a reservation lasting the average duration
    pub fn default_span(&self) -> usize {
        self.default_span
    }

    /// Span (in slots) for an explicit duration, falling back to the default
    pub fn span_for(&self, duration_minutes: Option<u32>) -> usize {
        match duration_minutes {
            Some(minutes) if minutes > 0 => span_for_minutes(minutes, self.slot_minutes),
            _ => self.default_span,
        }
    }

    /// Index of `slot` in service order
    pub fn position(&self, slot: TimeSlot) -> Option<usize> {
        self.slots.iter().position(|s| *s == slot)
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.position(slot).is_some()
    }

    /// Slot `delta` steps away from `slot` within the same service day
    pub fn offset(&self, slot: TimeSlot, delta: i64) -> Option<TimeSlot> {
        let pos = (self.position(slot)? as i64).checked_add(delta)?;
        if pos < 0 {
            return None;
        }
        self.slots.get(pos as usize).copied()
    }

    /// Consecutive slots of a window of `span` slots starting at `start`
    ///
    /// Consecutive follows service order, so an overnight window from 23:00
    /// covers 00:00 next. Windows running past closing are rejected.
    pub fn window(&self, start: TimeSlot, span: usize) -> Result<&[TimeSlot], SlotError> {
        let pos = self.position(start).ok_or(SlotError::UnknownSlot(start))?;
        let span = span.max(1);
        let end = pos + span;
        if end > self.slots.len() {
            return Err(SlotError::PastClosing { start, span });
        }
        Ok(&self.slots[pos..end])
    }
}

fn span_for_minutes(minutes: u32, slot_minutes: u32) -> usize {
    (minutes.div_ceil(slot_minutes) as usize).max(1)
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> Result<NaiveDate, SlotError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| SlotError::InvalidDate(date.to_string()))
}

/// Parse an IANA timezone name (e.g. `Europe/Belgrade`)
pub fn parse_timezone(name: &str) -> Result<Tz, SlotError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| SlotError::UnknownTimezone(name.to_string()))
}

/// 当前营业日 (业务时区)
///
/// For overnight hours the early-morning tail (before closing) still belongs
/// to the previous day's service.
pub fn service_date_today(hours: OperatingHours, tz: Tz) -> NaiveDate {
    let now = chrono::Utc::now().with_timezone(&tz).naive_local();
    service_date_at(hours, now)
}

/// Service date that a local timestamp belongs to
pub fn service_date_at(hours: OperatingHours, local: chrono::NaiveDateTime) -> NaiveDate {
    if hours.is_overnight() && local.time() < hours.closing {
        local.date().pred_opt().unwrap_or(local.date())
    } else {
        local.date()
    }
}
