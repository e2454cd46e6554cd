use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use toolbelt_core::{Job, JobStatus, NewJob};

use crate::utils::parse_optional_money;

/// Time of day a form-created job is scheduled for when only a date is
/// entered.
const DEFAULT_FORM_HOUR: u32 = 9;

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9+()\-. ]{7,20}$").expect("phone pattern compiles"))
}

/// Represents the collected values from the job form, as typed.
///
/// Everything is a string until [`JobFormModel::validate_for_submit`]
/// passes; parsing happens once, in [`JobFormModel::to_new_job`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobFormModel {
    pub client_name: String,
    pub phone: String,
    pub address: String,
    pub service_type: String,
    pub service_id: Option<i64>,
    pub description: String,
    /// `YYYY-MM-DD`; the job is scheduled at 09:00 on this day.
    pub scheduled_date: String,
    /// Empty means the price stays TBD.
    pub price: String,
}

impl JobFormModel {
    /// Pre-fills the form from an existing job for editing.
    pub fn from_job(job: &Job) -> Self {
        Self {
            client_name: job.client_name.clone(),
            phone: job.phone.clone(),
            address: job.address.clone(),
            service_type: job.service_type.clone(),
            service_id: job.service_id,
            description: job.description.clone(),
            scheduled_date: job.scheduled_at.date().format("%Y-%m-%d").to_string(),
            price: job
                .price
                .map(|p| p.to_string())
                .unwrap_or_default(),
        }
    }

    /// Validates that the model can be submitted.
    ///
    /// Rules:
    /// - client name and service type are required
    /// - scheduled date must be a valid `YYYY-MM-DD` date
    /// - phone, when present, must look like a phone number
    /// - price, when present, must be a non-negative amount
    pub fn validate_for_submit(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.client_name.trim().is_empty() {
            errors.push("client name is required".to_string());
        }
        if self.service_type.trim().is_empty() {
            errors.push("service type is required".to_string());
        }
        if self.parse_scheduled_date().is_none() {
            errors.push(format!(
                "scheduled date '{}' is not a valid date (expected YYYY-MM-DD)",
                self.scheduled_date
            ));
        }
        if !self.phone.trim().is_empty() && !phone_pattern().is_match(self.phone.trim()) {
            errors.push(format!("'{}' does not look like a phone number", self.phone));
        }
        match self.parse_price() {
            Ok(Some(price)) if price < Decimal::ZERO => {
                errors.push("price must not be negative".to_string());
            }
            Ok(_) => {}
            Err(message) => errors.push(message),
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn parse_scheduled_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.scheduled_date.trim(), "%Y-%m-%d").ok()
    }

    fn parse_price(&self) -> Result<Option<Decimal>, String> {
        let trimmed = self.price.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        parse_optional_money(trimmed)
            .map(Some)
            .ok_or_else(|| format!("price '{}' is not a valid amount", self.price))
    }

    /// Builds the job a submission would create. Validates first; the
    /// returned errors are the same user-facing list as
    /// [`JobFormModel::validate_for_submit`].
    pub fn to_new_job(&self) -> Result<NewJob, Vec<String>> {
        self.validate_for_submit()?;
        let date = self
            .parse_scheduled_date()
            .expect("validated date parses");
        let price = self.parse_price().expect("validated price parses");
        Ok(NewJob {
            client_name: self.client_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            service_type: self.service_type.trim().to_string(),
            service_id: self.service_id,
            description: self.description.trim().to_string(),
            scheduled_at: date
                .and_hms_opt(DEFAULT_FORM_HOUR, 0, 0)
                .expect("default form hour is valid"),
            price,
            estimated_cost: None,
            estimated_duration_hours: None,
            status: JobStatus::Scheduled,
            services: Vec::new(),
        })
    }

    /// Applies the form fields to an existing job for an edit submission.
    /// Status, timestamps and child collections are left alone.
    pub fn apply_to(&self, job: &mut Job) -> Result<(), Vec<String>> {
        self.validate_for_submit()?;
        let date = self
            .parse_scheduled_date()
            .expect("validated date parses");
        job.client_name = self.client_name.trim().to_string();
        job.phone = self.phone.trim().to_string();
        job.address = self.address.trim().to_string();
        job.service_type = self.service_type.trim().to_string();
        job.service_id = self.service_id;
        job.description = self.description.trim().to_string();
        // Keep the existing time of day; the form only edits the date.
        job.scheduled_at = date
            .and_time(job.scheduled_at.time());
        job.price = self.parse_price().expect("validated price parses");
        Ok(())
    }
}

impl fmt::Display for JobFormModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Client:        {}", self.client_name)?;
        writeln!(f, "Phone:         {}", self.phone)?;
        writeln!(f, "Address:       {}", self.address)?;
        writeln!(f, "Service:       {}", self.service_type)?;
        writeln!(f, "Scheduled:     {}", self.scheduled_date)?;
        write!(
            f,
            "Price:         {}",
            if self.price.trim().is_empty() {
                "TBD"
            } else {
                self.price.as_str()
            }
        )
    }
}
