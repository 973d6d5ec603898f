//! Schedule Model
//!
//! Table-by-timeslot matrix for one (date, timezone) pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dining_table::TableCell;
use crate::timeslot::TimeSlot;

/// All tables at one time slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub time: TimeSlot,
    #[serde(default)]
    pub tables: Vec<TableCell>,
}

impl ScheduleRow {
    pub fn new(time: TimeSlot, tables: Vec<TableCell>) -> Self {
        Self { time, tables }
    }

    /// Row for a slot whose fetch failed
    pub fn empty(time: TimeSlot) -> Self {
        Self {
            time,
            tables: Vec::new(),
        }
    }

    pub fn table(&self, table_id: i64) -> Option<&TableCell> {
        self.tables.iter().find(|c| c.table_id == table_id)
    }

    pub fn table_mut(&mut self, table_id: i64) -> Option<&mut TableCell> {
        self.tables.iter_mut().find(|c| c.table_id == table_id)
    }

    /// Stable id order keeps every table in the same column across refreshes
    pub fn sort_tables(&mut self) {
        self.tables.sort_by_key(|c| c.table_id);
    }
}

/// Day schedule: rows in service order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    pub timezone: String,
    pub rows: Vec<ScheduleRow>,
}

/// Per-slot counts for dashboard widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOccupancy {
    pub time: TimeSlot,
    pub booked: usize,
    pub free: usize,
    pub blocked: usize,
    pub guests: i32,
}

impl Schedule {
    pub fn new(date: NaiveDate, timezone: impl Into<String>, rows: Vec<ScheduleRow>) -> Self {
        Self {
            date,
            timezone: timezone.into(),
            rows,
        }
    }

    pub fn row(&self, time: TimeSlot) -> Option<&ScheduleRow> {
        self.rows.iter().find(|r| r.time == time)
    }

    pub fn row_mut(&mut self, time: TimeSlot) -> Option<&mut ScheduleRow> {
        self.rows.iter_mut().find(|r| r.time == time)
    }

    pub fn cell(&self, table_id: i64, time: TimeSlot) -> Option<&TableCell> {
        self.row(time).and_then(|r| r.table(table_id))
    }

    pub fn cell_mut(&mut self, table_id: i64, time: TimeSlot) -> Option<&mut TableCell> {
        self.row_mut(time).and_then(|r| r.table_mut(table_id))
    }

    /// Slots where `reservation_id` is attached to `table_id`
    pub fn slots_of(&self, table_id: i64, reservation_id: i64) -> Vec<TimeSlot> {
        self.rows
            .iter()
            .filter(|row| {
                row.table(table_id)
                    .and_then(|c| c.reservation.as_ref())
                    .is_some_and(|r| r.id == reservation_id)
            })
            .map(|row| row.time)
            .collect()
    }

    pub fn sort_tables(&mut self) {
        for row in &mut self.rows {
            row.sort_tables();
        }
    }

    /// Apply [`TableCell::normalize`] to every cell
    pub fn normalize(&mut self) {
        for cell in self.rows.iter_mut().flat_map(|r| r.tables.iter_mut()) {
            cell.normalize();
        }
    }

    /// Cells (slot, table id) whose content differs from `other`
    pub fn diff_cells(&self, other: &Schedule) -> Vec<(TimeSlot, i64)> {
        let mut changed = Vec::new();
        for row in &self.rows {
            for cell in &row.tables {
                if other.cell(cell.table_id, row.time) != Some(cell) {
                    changed.push((row.time, cell.table_id));
                }
            }
        }
        changed
    }

    /// Copy the listed cells from `source`, leaving every other cell untouched
    pub fn copy_cells_from(&mut self, source: &Schedule, cells: &[(TimeSlot, i64)]) {
        for &(time, table_id) in cells {
            if let (Some(from), Some(to)) = (source.cell(table_id, time), self.cell_mut(table_id, time)) {
                *to = from.clone();
            }
        }
    }

    pub fn occupancy(&self) -> Vec<SlotOccupancy> {
        self.rows
            .iter()
            .map(|row| {
                let mut occ = SlotOccupancy {
                    time: row.time,
                    booked: 0,
                    free: 0,
                    blocked: 0,
                    guests: 0,
                };
                for cell in &row.tables {
                    if cell.status.is_blocked() {
                        occ.blocked += 1;
                    } else if let Some(r) = cell.active_reservation() {
                        occ.booked += 1;
                        occ.guests += r.guest_count;
                    } else {
                        occ.free += 1;
                    }
                }
                occ
            })
            .collect()
    }
}
