use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use toolbelt_core::metrics::{DashboardMetrics, MonthlyRevenue, ReportWindow, monthly_earnings,
    todays_jobs};
use toolbelt_core::{Job, JobStatus, OpsRepository, RepositoryError};

use super::ScreenError;

/// How many of today's jobs the dashboard shows before pointing at the
/// jobs screen.
const TODAYS_SCHEDULE_LIMIT: usize = 3;

/// The landing screen: headline metrics, a short list of today's schedule
/// and the revenue trend, all recomputed from a fresh job fetch.
pub struct DashboardScreen {
    repo: Arc<dyn OpsRepository>,
    jobs: Vec<Job>,
}

impl DashboardScreen {
    pub async fn open(repo: Arc<dyn OpsRepository>) -> Result<Self, RepositoryError> {
        let jobs = repo.list_jobs().await?;
        Ok(Self { repo, jobs })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn metrics(&self, now: DateTime<Utc>) -> DashboardMetrics {
        DashboardMetrics::compute(&self.jobs, now)
    }

    /// The first few jobs scheduled today, earliest first.
    pub fn todays_schedule(&self, today: NaiveDate) -> Vec<&Job> {
        let mut jobs = todays_jobs(&self.jobs, today);
        jobs.sort_by_key(|job| job.scheduled_at);
        jobs.truncate(TODAYS_SCHEDULE_LIMIT);
        jobs
    }

    /// Six-month revenue trend for the dashboard chart.
    pub fn revenue_trend(&self, now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
        monthly_earnings(&self.jobs, ReportWindow::SixMonths, now)
    }

    /// Advances a job one status step, then reloads so every card reflects
    /// the stored state.
    pub async fn advance_status(&mut self, job_id: i64) -> Result<JobStatus, ScreenError> {
        let job = self
            .jobs
            .iter()
            .find(|job| job.id == job_id)
            .ok_or(ScreenError::JobNotLoaded(job_id))?;

        let mut updated = job.clone();
        let status = updated.advance_status(Utc::now())?;
        self.repo.update_job(&updated).await?;
        info!(job_id, status = status.as_str(), "job status advanced");

        self.jobs = self.repo.list_jobs().await?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use toolbelt_core::{JobError, NewJob};

    use crate::screens::support::MemoryRepository;

    use super::*;

    fn new_job(client: &str, date: NaiveDate, hour: u32) -> NewJob {
        NewJob {
            client_name: client.to_string(),
            phone: String::new(),
            address: String::new(),
            service_type: "General Repair".to_string(),
            service_id: None,
            description: String::new(),
            scheduled_at: date.and_hms_opt(hour, 0, 0).unwrap(),
            price: None,
            estimated_cost: None,
            estimated_duration_hours: None,
            status: toolbelt_core::JobStatus::Scheduled,
            services: Vec::new(),
        }
    }

    #[tokio::test]
    async fn todays_schedule_caps_at_three_sorted_by_time() {
        let repo = Arc::new(MemoryRepository::new());
        let today = Utc::now().date_naive();
        for hour in [15, 9, 11, 13] {
            repo.create_job(new_job(&format!("client {hour}"), today, hour))
                .await
                .unwrap();
        }

        let screen = DashboardScreen::open(repo).await.unwrap();
        let schedule = screen.todays_schedule(today);

        assert_eq!(schedule.len(), 3);
        let hours: Vec<u32> = schedule
            .iter()
            .map(|job| chrono::Timelike::hour(&job.scheduled_at))
            .collect();
        assert_eq!(hours, vec![9, 11, 13]);
    }

    #[tokio::test]
    async fn advance_status_persists_and_reloads() {
        let repo = Arc::new(MemoryRepository::new());
        let today = Utc::now().date_naive();
        let created = repo.create_job(new_job("Dana", today, 9)).await.unwrap();

        let mut screen = DashboardScreen::open(repo.clone()).await.unwrap();
        let status = screen.advance_status(created.id).await.unwrap();

        assert_eq!(status, JobStatus::InProgress);
        assert_eq!(screen.jobs()[0].status, JobStatus::InProgress);
        assert_eq!(
            repo.get_job(created.id).await.unwrap().status,
            JobStatus::InProgress
        );
    }

    #[tokio::test]
    async fn advance_status_on_terminal_job_fails_locally() {
        let repo = Arc::new(MemoryRepository::new());
        let today = Utc::now().date_naive();
        let mut paid = new_job("Dana", today, 9);
        paid.status = JobStatus::Paid;
        let created = repo.create_job(paid).await.unwrap();

        let mut screen = DashboardScreen::open(repo).await.unwrap();
        let result = screen.advance_status(created.id).await;

        assert_eq!(
            result,
            Err(ScreenError::Job(JobError::AlreadyTerminal(JobStatus::Paid)))
        );
    }

    #[tokio::test]
    async fn advance_status_on_unknown_job_is_not_loaded() {
        let repo = Arc::new(MemoryRepository::new());
        let mut screen = DashboardScreen::open(repo).await.unwrap();

        let result = screen.advance_status(42).await;

        assert_eq!(result, Err(ScreenError::JobNotLoaded(42)));
    }

    #[tokio::test]
    async fn metrics_come_from_loaded_jobs() {
        let repo = Arc::new(MemoryRepository::new());
        let today = Utc::now().date_naive();
        repo.create_job(new_job("Dana", today, 9)).await.unwrap();

        let screen = DashboardScreen::open(repo).await.unwrap();
        let metrics = screen.metrics(Utc::now());

        assert_eq!(metrics.todays_jobs, 1);
        assert_eq!(metrics.pending_estimates, 1);
    }
}
