//! Calendar grid construction and job placement.
//!
//! The month view is a fixed 6-week (42 cell) Sunday-start span covering
//! the anchor month plus the leading and trailing days of its neighbors.
//! Week and day views share a fixed band of hourly rows.

use chrono::{Datelike, NaiveDate, TimeDelta, Timelike};

use crate::models::Job;

/// First hourly row shown in the week/day views (07:00).
pub const DAY_START_HOUR: u32 = 7;
/// Last hourly row shown in the week/day views (18:00).
pub const DAY_END_HOUR: u32 = 18;
/// Jobs visible in a month cell before the overflow indicator kicks in.
pub const MONTH_CELL_CAP: usize = 3;

/// The hourly rows of the week/day grid, top to bottom.
pub fn hour_rows() -> Vec<u32> {
    (DAY_START_HOUR..=DAY_END_HOUR).collect()
}

/// The Sunday on or before the given date.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(date.weekday().num_days_from_sunday() as i64)
}

/// The 42 day cells of the month view for the month containing `anchor`:
/// six Sunday-start weeks, beginning on or before the 1st, so the leading
/// and trailing days of adjacent months fill out the grid.
pub fn month_span(anchor: NaiveDate) -> Vec<NaiveDate> {
    let first_of_month = anchor.with_day(1).expect("day 1 exists in every month");
    let start = week_start(first_of_month);
    (0..42).map(|i| start + TimeDelta::days(i)).collect()
}

/// The 7 day columns of the week view containing `anchor`, Sunday first.
pub fn week_span(anchor: NaiveDate) -> [NaiveDate; 7] {
    let start = week_start(anchor);
    std::array::from_fn(|i| start + TimeDelta::days(i as i64))
}

/// Jobs scheduled on the given day, earliest first.
pub fn jobs_on_day(jobs: &[Job], day: NaiveDate) -> Vec<&Job> {
    let mut found: Vec<&Job> = jobs
        .iter()
        .filter(|job| job.scheduled_at.date() == day)
        .collect();
    found.sort_by_key(|job| job.scheduled_at);
    found
}

/// Jobs whose scheduled time falls within the given top-of-hour slot.
pub fn jobs_in_slot(jobs: &[Job], day: NaiveDate, hour: u32) -> Vec<&Job> {
    let mut found: Vec<&Job> = jobs
        .iter()
        .filter(|job| job.scheduled_at.date() == day && job.scheduled_at.hour() == hour)
        .collect();
    found.sort_by_key(|job| job.scheduled_at);
    found
}

/// One rendered cell of the month grid: up to [`MONTH_CELL_CAP`] visible
/// jobs plus an overflow count for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCell<'a> {
    pub date: NaiveDate,
    pub jobs: Vec<&'a Job>,
    /// Number of additional jobs hidden behind the "+N more" indicator.
    pub overflow: usize,
}

pub fn month_cell(jobs: &[Job], date: NaiveDate) -> MonthCell<'_> {
    let mut on_day = jobs_on_day(jobs, date);
    let overflow = on_day.len().saturating_sub(MONTH_CELL_CAP);
    on_day.truncate(MONTH_CELL_CAP);
    MonthCell {
        date,
        jobs: on_day,
        overflow,
    }
}
