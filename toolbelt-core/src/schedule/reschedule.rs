//! Drag-and-drop rescheduling.
//!
//! Dropping a job onto the calendar computes a new scheduled slot and runs
//! a small two-phase state machine: the move is applied locally right away
//! for responsiveness, then either confirmed when the store accepts the
//! update or rolled back to the original slot when it fails. The job is
//! in exactly one position at every point.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::models::Job;

/// Time of day a job lands on when dropped onto a whole-day cell (09:00).
pub const DEFAULT_DROP_HOUR: u32 = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("hour {0} is out of range")]
    InvalidHour(u32),

    #[error("drag already settled")]
    AlreadySettled,
}

/// Where a job was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A month-view day cell; the time of day defaults to 09:00.
    Day(NaiveDate),
    /// A week/day-view hourly slot; minutes are zeroed.
    Slot { date: NaiveDate, hour: u32 },
}

/// The scheduled slot a drop target resolves to.
pub fn drop_schedule(target: DropTarget) -> Result<NaiveDateTime, ScheduleError> {
    match target {
        DropTarget::Day(date) => Ok(date
            .and_hms_opt(DEFAULT_DROP_HOUR, 0, 0)
            .expect("default drop hour is valid")),
        DropTarget::Slot { date, hour } => date
            .and_hms_opt(hour, 0, 0)
            .ok_or(ScheduleError::InvalidHour(hour)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Optimistic move applied locally; store confirmation outstanding.
    Pending,
    Confirmed,
    RolledBack,
}

/// One in-flight drag operation. Holds the original slot so a failed store
/// update can put the job back exactly where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragReschedule {
    pub job_id: i64,
    pub original: NaiveDateTime,
    pub proposed: NaiveDateTime,
    phase: DragPhase,
}

impl DragReschedule {
    /// Applies the optimistic move to the job and opens the pending phase.
    /// All other job fields are untouched; the store update that follows
    /// stamps `updated_at` the same way every other edit does.
    pub fn begin(job: &mut Job, target: DropTarget) -> Result<Self, ScheduleError> {
        let proposed = drop_schedule(target)?;
        let original = job.scheduled_at;
        tracing::debug!(job_id = job.id, %original, %proposed, "optimistic reschedule");
        job.scheduled_at = proposed;
        Ok(Self {
            job_id: job.id,
            original,
            proposed,
            phase: DragPhase::Pending,
        })
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Settles the drag after the store accepted the update.
    pub fn confirm(&mut self) -> Result<(), ScheduleError> {
        if self.phase != DragPhase::Pending {
            return Err(ScheduleError::AlreadySettled);
        }
        self.phase = DragPhase::Confirmed;
        Ok(())
    }

    /// Reverts the optimistic move after the store rejected the update.
    pub fn roll_back(&mut self, job: &mut Job) -> Result<(), ScheduleError> {
        if self.phase != DragPhase::Pending {
            return Err(ScheduleError::AlreadySettled);
        }
        job.scheduled_at = self.original;
        self.phase = DragPhase::RolledBack;
        Ok(())
    }
}
