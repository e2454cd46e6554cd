use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use toolbelt_core::metrics::{
    MonthlyRevenue, ReportWindow, average_job_value, monthly_earnings, revenue_by_service,
    status_distribution,
};
use toolbelt_core::{Job, JobStatus, OpsRepository, RepositoryError};

/// The reports screen: window-selectable earnings plus the service and
/// status breakdowns, all derived from one job fetch at open time.
pub struct ReportsScreen {
    jobs: Vec<Job>,
    window: ReportWindow,
}

impl ReportsScreen {
    pub async fn open(repo: Arc<dyn OpsRepository>) -> Result<Self, RepositoryError> {
        let jobs = repo.list_jobs().await?;
        Ok(Self {
            jobs,
            window: ReportWindow::SixMonths,
        })
    }

    pub fn window(&self) -> ReportWindow {
        self.window
    }

    pub fn set_window(&mut self, window: ReportWindow) {
        self.window = window;
    }

    pub fn earnings(&self, now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
        monthly_earnings(&self.jobs, self.window, now)
    }

    pub fn revenue_by_service(&self) -> Vec<(String, Decimal)> {
        revenue_by_service(&self.jobs)
    }

    pub fn status_distribution(&self) -> Vec<(JobStatus, usize)> {
        status_distribution(&self.jobs)
    }

    pub fn average_job_value(&self) -> Option<Decimal> {
        average_job_value(&self.jobs)
    }
}
