//! Time dimension

use crate::error::{Error, Result};
use crate::store::WarehouseStore;
use crate::types::{PlayEvent, TimeRow};
use chrono::{DateTime, Datelike, Timelike};

/// Split an epoch-millisecond timestamp into calendar fields (UTC)
///
/// Weekday counts from Monday = 0; week is the ISO 8601 week number, so the
/// first days of January can belong to week 52 or 53 of the previous year.
pub fn decompose_timestamp(ts: i64) -> Result<TimeRow> {
    let dt = DateTime::from_timestamp_millis(ts)
        .ok_or_else(|| Error::invalid_field("log event", "ts", "is out of range"))?
        .naive_utc();

    Ok(TimeRow {
        start_time: ts,
        hour: dt.hour() as i32,
        day: dt.day() as i32,
        week: dt.iso_week().week() as i32,
        month: dt.month() as i32,
        year: dt.year(),
        weekday: dt.weekday().num_days_from_monday() as i32,
    })
}

/// Upserts one time row per playback event
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeDimensionBuilder;

impl TimeDimensionBuilder {
    /// Returns the number of upserts issued (repeated timestamps included)
    pub fn load(&self, store: &dyn WarehouseStore, events: &[PlayEvent]) -> Result<usize> {
        for event in events {
            store.upsert_time(&decompose_timestamp(event.ts)?)?;
        }
        Ok(events.len())
    }
}
