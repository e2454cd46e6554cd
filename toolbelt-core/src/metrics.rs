//! Dashboard and report aggregations.
//!
//! Pure functions over the full job collection, recomputed on every call;
//! there is no caching or invalidation layer. A missing price counts as
//! zero in sums, but jobs without a price are excluded from the
//! denominator of the average job value.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Job, JobStatus};

/// Trailing window for the report views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportWindow {
    ThreeMonths,
    SixMonths,
    TwelveMonths,
}

impl ReportWindow {
    pub fn months(&self) -> u32 {
        match self {
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
        }
    }
}

/// Revenue collected in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub total: Decimal,
}

/// The headline numbers on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub todays_jobs: usize,
    pub pending_estimates: usize,
    /// Paid jobs whose payment landed in the current calendar month.
    pub recent_payments: usize,
    /// All-time earnings over paid jobs.
    pub total_earnings: Decimal,
}

impl DashboardMetrics {
    pub fn compute(jobs: &[Job], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            todays_jobs: todays_jobs(jobs, today).len(),
            pending_estimates: pending_estimates(jobs).len(),
            recent_payments: payments_in_month(jobs, today.year(), today.month()),
            total_earnings: total_paid_earnings(jobs),
        }
    }
}

/// Jobs scheduled on the given calendar day.
pub fn todays_jobs(jobs: &[Job], today: NaiveDate) -> Vec<&Job> {
    jobs.iter()
        .filter(|job| job.scheduled_at.date() == today)
        .collect()
}

/// Scheduled jobs whose price is still TBD.
pub fn pending_estimates(jobs: &[Job]) -> Vec<&Job> {
    jobs.iter()
        .filter(|job| job.status == JobStatus::Scheduled && job.price.is_none())
        .collect()
}

/// Sum of prices over paid jobs; a paid job without a price contributes
/// zero.
pub fn total_paid_earnings(jobs: &[Job]) -> Decimal {
    jobs.iter()
        .filter(|job| job.status == JobStatus::Paid)
        .filter_map(|job| job.price)
        .sum()
}

/// Count of paid jobs whose `paid_at` falls in the given calendar month.
pub fn payments_in_month(jobs: &[Job], year: i32, month: u32) -> usize {
    jobs.iter()
        .filter(|job| job.status == JobStatus::Paid)
        .filter(|job| {
            job.paid_at.is_some_and(|paid| {
                let paid = paid.date_naive();
                paid.year() == year && paid.month() == month
            })
        })
        .count()
}

/// Paid revenue bucketed by calendar month over a trailing window ending in
/// the current month, oldest bucket first. Months with no payments appear
/// with a zero total so charts keep a continuous axis.
pub fn monthly_earnings(jobs: &[Job], window: ReportWindow, now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
    let anchor = now
        .date_naive()
        .with_day(1)
        .expect("day 1 exists in every month");
    (0..window.months())
        .rev()
        .map(|offset| {
            let month_start = anchor
                .checked_sub_months(Months::new(offset))
                .unwrap_or(anchor);
            let total = jobs
                .iter()
                .filter(|job| job.status == JobStatus::Paid)
                .filter(|job| {
                    job.paid_at.is_some_and(|paid| {
                        let paid = paid.date_naive();
                        paid.year() == month_start.year() && paid.month() == month_start.month()
                    })
                })
                .filter_map(|job| job.price)
                .sum();
            MonthlyRevenue {
                year: month_start.year(),
                month: month_start.month(),
                total,
            }
        })
        .collect()
}

/// Paid revenue grouped by the job's stored service type, highest first.
/// The stored text is used even when the catalog reference dangles.
pub fn revenue_by_service(jobs: &[Job]) -> Vec<(String, Decimal)> {
    let mut by_service: HashMap<&str, Decimal> = HashMap::new();
    for job in jobs.iter().filter(|job| job.status == JobStatus::Paid) {
        let revenue = job.price.unwrap_or(Decimal::ZERO);
        *by_service.entry(job.service_type.as_str()).or_default() += revenue;
    }
    let mut rows: Vec<(String, Decimal)> = by_service
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// Job counts per status, in lifecycle order.
pub fn status_distribution(jobs: &[Job]) -> Vec<(JobStatus, usize)> {
    [
        JobStatus::Scheduled,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Paid,
    ]
    .into_iter()
    .map(|status| (status, jobs.iter().filter(|j| j.status == status).count()))
    .collect()
}

/// Mean price across jobs that have a committed price. `None` when no job
/// is priced — unpriced jobs never dilute the denominator.
pub fn average_job_value(jobs: &[Job]) -> Option<Decimal> {
    let priced: Vec<Decimal> = jobs.iter().filter_map(|job| job.price).collect();
    if priced.is_empty() {
        return None;
    }
    let count = Decimal::from(priced.len() as u64);
    Some(priced.iter().copied().sum::<Decimal>() / count)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn job(id: i64, status: JobStatus, price: Option<Decimal>) -> Job {
        let created = utc(2025, 1, 1);
        Job {
            id,
            client_name: format!("Client {id}"),
            phone: String::new(),
            address: String::new(),
            service_type: "General Repair".to_string(),
            service_id: None,
            description: String::new(),
            scheduled_at: date(2025, 6, 16).and_hms_opt(9, 0, 0).unwrap(),
            price,
            estimated_cost: None,
            estimated_duration_hours: None,
            status,
            completed_at: None,
            paid_at: None,
            created_at: created,
            updated_at: created,
            notes: Vec::new(),
            photos: Vec::new(),
            services: Vec::new(),
        }
    }

    fn paid_job(id: i64, price: Decimal, paid_at: DateTime<Utc>) -> Job {
        let mut j = job(id, JobStatus::Paid, Some(price));
        j.paid_at = Some(paid_at);
        j
    }

    #[test]
    fn todays_jobs_matches_scheduled_day_only() {
        let mut tomorrow = job(2, JobStatus::Scheduled, None);
        tomorrow.scheduled_at = date(2025, 6, 17).and_hms_opt(9, 0, 0).unwrap();
        let jobs = vec![job(1, JobStatus::Scheduled, None), tomorrow];

        let found = todays_jobs(&jobs, date(2025, 6, 16));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn pending_estimates_require_scheduled_and_unpriced() {
        let jobs = vec![
            job(1, JobStatus::Scheduled, None),
            job(2, JobStatus::Scheduled, Some(dec!(100))),
            job(3, JobStatus::InProgress, None),
        ];

        let pending = pending_estimates(&jobs);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 1);
    }

    #[test]
    fn total_earnings_sum_paid_jobs_only() {
        let jobs = vec![
            paid_job(1, dec!(150), utc(2025, 6, 2)),
            paid_job(2, dec!(200), utc(2025, 5, 20)),
            job(3, JobStatus::Completed, Some(dec!(999))),
        ];

        assert_eq!(total_paid_earnings(&jobs), dec!(350));
    }

    #[test]
    fn paid_job_without_price_counts_as_zero() {
        let mut unpriced = job(1, JobStatus::Paid, None);
        unpriced.paid_at = Some(utc(2025, 6, 2));
        let jobs = vec![unpriced, paid_job(2, dec!(80), utc(2025, 6, 3))];

        assert_eq!(total_paid_earnings(&jobs), dec!(80));
    }

    #[test]
    fn payments_in_month_checks_paid_at() {
        let jobs = vec![
            paid_job(1, dec!(150), utc(2025, 6, 2)),
            paid_job(2, dec!(200), utc(2025, 5, 20)),
        ];

        assert_eq!(payments_in_month(&jobs, 2025, 6), 1);
        assert_eq!(payments_in_month(&jobs, 2025, 5), 1);
        assert_eq!(payments_in_month(&jobs, 2025, 4), 0);
    }

    #[test]
    fn monthly_earnings_buckets_trailing_window_oldest_first() {
        let jobs = vec![
            paid_job(1, dec!(100), utc(2025, 6, 2)),
            paid_job(2, dec!(50), utc(2025, 5, 20)),
            paid_job(3, dec!(25), utc(2025, 1, 10)), // outside 3-month window
        ];

        let buckets = monthly_earnings(&jobs, ReportWindow::ThreeMonths, utc(2025, 6, 16));

        assert_eq!(buckets.len(), 3);
        assert_eq!((buckets[0].year, buckets[0].month), (2025, 4));
        assert_eq!(buckets[0].total, Decimal::ZERO);
        assert_eq!(buckets[1].total, dec!(50));
        assert_eq!(buckets[2].total, dec!(100));
    }

    #[test]
    fn monthly_earnings_window_crosses_year_boundary() {
        let jobs = vec![paid_job(1, dec!(75), utc(2024, 12, 30))];

        let buckets = monthly_earnings(&jobs, ReportWindow::SixMonths, utc(2025, 2, 10));

        assert_eq!(buckets.len(), 6);
        assert_eq!((buckets[0].year, buckets[0].month), (2024, 9));
        let december = buckets
            .iter()
            .find(|b| b.year == 2024 && b.month == 12)
            .unwrap();
        assert_eq!(december.total, dec!(75));
    }

    #[test]
    fn revenue_by_service_groups_and_sorts_descending() {
        let mut plumbing = paid_job(1, dec!(300), utc(2025, 6, 1));
        plumbing.service_type = "Plumbing".to_string();
        let mut plumbing2 = paid_job(2, dec!(100), utc(2025, 6, 2));
        plumbing2.service_type = "Plumbing".to_string();
        let mut electrical = paid_job(3, dec!(250), utc(2025, 6, 3));
        electrical.service_type = "Electrical".to_string();

        let rows = revenue_by_service(&[plumbing, plumbing2, electrical]);

        assert_eq!(
            rows,
            vec![
                ("Plumbing".to_string(), dec!(400)),
                ("Electrical".to_string(), dec!(250)),
            ]
        );
    }

    #[test]
    fn status_distribution_counts_every_status() {
        let jobs = vec![
            job(1, JobStatus::Scheduled, None),
            job(2, JobStatus::Scheduled, None),
            job(3, JobStatus::Paid, Some(dec!(100))),
        ];

        let distribution = status_distribution(&jobs);

        assert_eq!(
            distribution,
            vec![
                (JobStatus::Scheduled, 2),
                (JobStatus::InProgress, 0),
                (JobStatus::Completed, 0),
                (JobStatus::Paid, 1),
            ]
        );
    }

    #[test]
    fn average_job_value_ignores_unpriced_jobs_in_denominator() {
        let jobs = vec![
            job(1, JobStatus::Scheduled, Some(dec!(100))),
            job(2, JobStatus::Scheduled, Some(dec!(200))),
            job(3, JobStatus::Scheduled, None),
        ];

        assert_eq!(average_job_value(&jobs), Some(dec!(150)));
    }

    #[test]
    fn average_job_value_is_none_with_no_priced_jobs() {
        let jobs = vec![job(1, JobStatus::Scheduled, None)];
        assert_eq!(average_job_value(&jobs), None);
    }

    #[test]
    fn dashboard_metrics_bundle() {
        let now = utc(2025, 6, 16);
        let mut today_job = job(1, JobStatus::Scheduled, None);
        today_job.scheduled_at = date(2025, 6, 16).and_hms_opt(10, 0, 0).unwrap();
        let jobs = vec![
            today_job,
            paid_job(2, dec!(400), utc(2025, 6, 2)),
            paid_job(3, dec!(100), utc(2025, 4, 2)),
        ];

        let metrics = DashboardMetrics::compute(&jobs, now);

        assert_eq!(metrics.todays_jobs, 3); // all three share the default slot date
        assert_eq!(metrics.pending_estimates, 1);
        assert_eq!(metrics.recent_payments, 1);
        assert_eq!(metrics.total_earnings, dec!(500));
    }
}
