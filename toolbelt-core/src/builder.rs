//! Interactive estimate builder.
//!
//! Tracks the in-memory service selection while a quick estimate is being
//! put together, guards the convert/print/email actions against duplicate
//! submission, and converts a non-empty selection into a [`NewJob`] whose
//! services manifest snapshots catalog rates at conversion time.
//!
//! The builder itself never talks to a store; the screen layer calls
//! [`EstimateBuilder::begin`], performs the backend call, then settles the
//! outcome with [`EstimateBuilder::complete`] or [`EstimateBuilder::cancel`].

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{JobServiceLine, JobStatus, NewJob, PricingType, Service};
use crate::pricing::common::format_money;
use crate::pricing::{EstimateCalculator, EstimateLineItem, EstimateTotals, PricingError};

/// The busy states a builder can be in while an action is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderAction {
    Converting,
    Printing,
    Emailing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    /// Convert/print/email requested with no services selected.
    #[error("select at least one service first")]
    EmptySelection,

    /// Another action is already in flight; duplicate submission guard.
    #[error("an action is already in progress")]
    Busy(BuilderAction),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// In-memory selection state for the quick-estimate modal.
#[derive(Debug, Clone, Default)]
pub struct EstimateBuilder {
    line_items: Vec<EstimateLineItem>,
    in_flight: Option<BuilderAction>,
}

impl EstimateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_items(&self) -> &[EstimateLineItem] {
        &self.line_items
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    pub fn in_flight(&self) -> Option<BuilderAction> {
        self.in_flight
    }

    /// Selects the service with quantity 1, or removes it if already
    /// selected. One click toggles; a second click on the same service
    /// restores the previous state.
    pub fn toggle_service(&mut self, service_id: i64) {
        if let Some(index) = self
            .line_items
            .iter()
            .position(|item| item.service_id == service_id)
        {
            self.line_items.remove(index);
        } else {
            self.line_items.push(EstimateLineItem {
                service_id,
                quantity: 1,
            });
        }
    }

    /// Sets the quantity for a selected service, clamped to at least 1.
    /// No-op when the service is not selected.
    pub fn set_quantity(&mut self, service_id: i64, quantity: i64) {
        let quantity = quantity.max(1) as u32;
        if let Some(item) = self
            .line_items
            .iter_mut()
            .find(|item| item.service_id == service_id)
        {
            item.quantity = quantity;
        }
    }

    /// Aggregate totals for the current selection.
    pub fn totals(&self, catalog: &[Service]) -> Result<EstimateTotals, PricingError> {
        EstimateCalculator::new(catalog).totals(&self.line_items)
    }

    /// Marks an action as in flight. Fails when the selection is empty or
    /// another action has not settled yet.
    pub fn begin(&mut self, action: BuilderAction) -> Result<(), BuilderError> {
        if self.line_items.is_empty() {
            return Err(BuilderError::EmptySelection);
        }
        if let Some(current) = self.in_flight {
            return Err(BuilderError::Busy(current));
        }
        tracing::debug!(?action, items = self.line_items.len(), "estimate action started");
        self.in_flight = Some(action);
        Ok(())
    }

    /// Settles a successful action. A successful conversion clears the
    /// selection; print/email leave it in place for further edits.
    pub fn complete(&mut self) {
        if self.in_flight.take() == Some(BuilderAction::Converting) {
            self.line_items.clear();
        }
    }

    /// Settles a failed action: the busy flag clears but the selection is
    /// retained so the user can retry.
    pub fn cancel(&mut self) {
        self.in_flight = None;
    }

    /// Builds the job a conversion would create: scheduled now, price TBD,
    /// status Scheduled, and a services manifest frozen at today's catalog
    /// rates.
    pub fn build_job(
        &self,
        catalog: &[Service],
        now: NaiveDateTime,
    ) -> Result<NewJob, BuilderError> {
        if self.line_items.is_empty() {
            return Err(BuilderError::EmptySelection);
        }

        let calculator = EstimateCalculator::new(catalog);
        let totals = calculator.totals(&self.line_items)?;

        let mut services = Vec::with_capacity(self.line_items.len());
        let mut names = Vec::with_capacity(self.line_items.len());
        let mut description_lines = Vec::with_capacity(self.line_items.len());
        for item in &self.line_items {
            let service = calculator.service(item.service_id)?;
            let rate = match service.pricing {
                PricingType::Hourly => service
                    .hourly_rate
                    .ok_or(PricingError::MissingHourlyRate(service.id))?,
                PricingType::Flat => service
                    .flat_rate
                    .ok_or(PricingError::MissingFlatRate(service.id))?,
            };
            let rate_text = match service.pricing {
                PricingType::Hourly => format!(
                    "{}/hr x {}hrs",
                    format_money(rate),
                    service.estimated_duration_hours
                ),
                PricingType::Flat => format!("{} flat rate", format_money(rate)),
            };
            let total = calculator.line_total(item)?;
            names.push(format!("{} ({}x)", service.name, item.quantity));
            description_lines.push(format!(
                "- {} - Qty: {} - {} = {}",
                service.name,
                item.quantity,
                rate_text,
                format_money(total)
            ));
            services.push(JobServiceLine {
                service_id: service.id,
                service_name: service.name.clone(),
                quantity: item.quantity,
                rate,
                pricing: service.pricing,
                estimated_duration_hours: service.estimated_duration_hours,
            });
        }

        let description = format!(
            "Quick estimate for selected services:\n{}\n\nEstimated total: {}",
            description_lines.join("\n"),
            format_money(totals.labor_cost)
        );

        Ok(NewJob {
            client_name: String::new(),
            phone: String::new(),
            address: String::new(),
            service_type: format!("Estimate: {}", names.join(", ")),
            service_id: None,
            description,
            scheduled_at: now,
            price: None,
            estimated_cost: Some(totals.labor_cost),
            estimated_duration_hours: Some(totals.total_duration_hours),
            status: JobStatus::Scheduled,
            services,
        })
    }
}
