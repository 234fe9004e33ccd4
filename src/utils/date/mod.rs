//! Time grid model and visible-range helpers.
//!
//! A calendar day is split into one-hour slots between the first and last
//! work hour. One hour in the middle is reserved for lunch and never accepts
//! a visit. Everything here is pure.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FIRST_HOUR: u32 = 6;
pub const DEFAULT_LAST_HOUR: u32 = 17;
pub const DEFAULT_LUNCH_HOUR: u32 = 12;

/// Identifies one (calendar day, hour) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub hour: u32,
}

impl SlotKey {
    /// Slot an instant falls into, using its local date and hour.
    pub fn of_datetime(datetime: &DateTime<Local>) -> Self {
        slot_key_of(datetime.date_naive(), datetime.hour())
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:02}", self.date.format("%Y-%m-%d"), self.hour)
    }
}

/// Canonical key for a (day, hour) pair. Injective over its inputs.
pub fn slot_key_of(date: NaiveDate, hour: u32) -> SlotKey {
    SlotKey { date, hour }
}

/// The fixed set of work hours with its reserved lunch slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    first_hour: u32,
    last_hour: u32,
    lunch_hour: u32,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            first_hour: DEFAULT_FIRST_HOUR,
            last_hour: DEFAULT_LAST_HOUR,
            lunch_hour: DEFAULT_LUNCH_HOUR,
        }
    }
}

impl TimeGrid {
    /// Build a grid, requiring `first <= lunch <= last < 24`.
    pub fn new(first_hour: u32, last_hour: u32, lunch_hour: u32) -> Result<Self, String> {
        if last_hour > 23 {
            return Err(format!("Last work hour {} is past the end of the day", last_hour));
        }
        if first_hour > last_hour {
            return Err(format!(
                "First work hour {} is after last work hour {}",
                first_hour, last_hour
            ));
        }
        if lunch_hour < first_hour || lunch_hour > last_hour {
            return Err(format!(
                "Lunch hour {} lies outside {}..={}",
                lunch_hour, first_hour, last_hour
            ));
        }

        Ok(Self {
            first_hour,
            last_hour,
            lunch_hour,
        })
    }

    pub fn first_hour(&self) -> u32 {
        self.first_hour
    }

    pub fn last_hour(&self) -> u32 {
        self.last_hour
    }

    pub fn lunch_hour(&self) -> u32 {
        self.lunch_hour
    }

    /// Every hour shown on the grid in order, lunch included.
    pub fn work_hours(&self) -> Vec<u32> {
        (self.first_hour..=self.last_hour).collect()
    }

    /// False only for the reserved lunch hour.
    pub fn is_bookable(&self, hour: u32) -> bool {
        hour != self.lunch_hour
    }

    /// Whether `hour` is part of the grid at all.
    pub fn is_work_hour(&self, hour: u32) -> bool {
        (self.first_hour..=self.last_hour).contains(&hour)
    }

    /// Local instant at which a slot starts. `None` when the wall-clock time
    /// does not exist on that day (DST gap).
    pub fn start_of_slot(&self, key: SlotKey) -> Option<DateTime<Local>> {
        let naive = key.date.and_hms_opt(key.hour, 0, 0)?;
        Local.from_local_datetime(&naive).earliest()
    }
}

/// Half-open `[start, end)` window of time the calendar is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl DateRange {
    pub fn new(start: DateTime<Local>, end: DateTime<Local>) -> Result<Self, String> {
        if end <= start {
            return Err("Date range end must be after its start".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: &DateTime<Local>) -> bool {
        *instant >= self.start && *instant < self.end
    }

    /// Calendar days touched by this range, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        let last = (self.end - Duration::nanoseconds(1)).date_naive();
        first.iter_days().take_while(|day| *day <= last).collect()
    }
}

/// Local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
}

/// The single day `date`.
pub fn day_range(date: NaiveDate) -> Option<DateRange> {
    let start = start_of_day(date)?;
    let end = start_of_day(date.succ_opt()?)?;
    DateRange::new(start, end).ok()
}

/// Monday-to-Sunday week containing `date`.
pub fn week_containing(date: NaiveDate) -> Option<DateRange> {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let start = start_of_day(monday)?;
    let end = start_of_day(monday + Duration::days(7))?;
    DateRange::new(start, end).ok()
}

/// Whole weeks from the one containing `a` through the one containing `b`,
/// in either order.
pub fn weeks_spanning(a: NaiveDate, b: NaiveDate) -> Option<DateRange> {
    let first = week_containing(a.min(b))?;
    let last = week_containing(a.max(b))?;
    DateRange::new(first.start, last.end).ok()
}
