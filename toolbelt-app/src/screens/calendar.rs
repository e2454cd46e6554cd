use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use toolbelt_core::schedule::{
    CalendarView, DragReschedule, DropTarget, MonthCell, ViewState, hour_rows, jobs_in_slot,
    month_cell, month_span, week_span,
};
use toolbelt_core::{Job, OpsRepository, RepositoryError};

use super::ScreenError;

/// The calendar screen: month/week/day navigation over the loaded jobs and
/// the drag-and-drop reschedule path.
pub struct CalendarScreen {
    repo: Arc<dyn OpsRepository>,
    jobs: Vec<Job>,
    view: ViewState,
}

impl CalendarScreen {
    pub async fn open(
        repo: Arc<dyn OpsRepository>,
        today: NaiveDate,
    ) -> Result<Self, RepositoryError> {
        let jobs = repo.list_jobs().await?;
        Ok(Self {
            repo,
            jobs,
            view: ViewState::new(today, CalendarView::Month),
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn set_view(&mut self, view: CalendarView) {
        self.view.set_view(view);
    }

    pub fn previous(&mut self) {
        self.view.previous();
    }

    pub fn next(&mut self) {
        self.view.next();
    }

    pub fn today(&mut self, today: NaiveDate) {
        self.view.today(today);
    }

    /// The 42 rendered cells of the current month grid.
    pub fn month_cells(&self) -> Vec<MonthCell<'_>> {
        month_span(self.view.current)
            .into_iter()
            .map(|date| month_cell(&self.jobs, date))
            .collect()
    }

    /// The week view: 7 day columns, each with its hourly slots.
    pub fn week_columns(&self) -> Vec<(NaiveDate, Vec<(u32, Vec<&Job>)>)> {
        week_span(self.view.current)
            .into_iter()
            .map(|date| (date, self.day_slots(date)))
            .collect()
    }

    /// Hourly slots for a single day column.
    pub fn day_slots(&self, date: NaiveDate) -> Vec<(u32, Vec<&Job>)> {
        hour_rows()
            .into_iter()
            .map(|hour| (hour, jobs_in_slot(&self.jobs, date, hour)))
            .collect()
    }

    /// Drag-and-drop reschedule: applies the move optimistically, persists
    /// it through the ordinary job-update path, and rolls the job back to
    /// its original slot if the store rejects it. The job is never shown in
    /// two places and never dropped.
    pub async fn drop_job(
        &mut self,
        job_id: i64,
        target: DropTarget,
    ) -> Result<(), ScreenError> {
        let index = self
            .jobs
            .iter()
            .position(|job| job.id == job_id)
            .ok_or(ScreenError::JobNotLoaded(job_id))?;

        let mut drag = DragReschedule::begin(&mut self.jobs[index], target)?;
        match self.repo.update_job(&self.jobs[index]).await {
            Ok(stored) => {
                drag.confirm().expect("pending drag confirms once");
                info!(job_id, slot = %stored.scheduled_at, "job rescheduled");
                self.jobs[index] = stored;
                Ok(())
            }
            Err(error) => {
                drag.roll_back(&mut self.jobs[index])
                    .expect("pending drag rolls back once");
                warn!(job_id, %error, "reschedule rejected, move rolled back");
                Err(error.into())
            }
        }
    }
}
