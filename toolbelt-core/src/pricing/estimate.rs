//! Estimate pricing.
//!
//! Converts a selection of catalog services and quantities into line totals
//! and aggregate figures. Pure and stateless: the calculator borrows the
//! catalog and never mutates its inputs.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toolbelt_core::models::{PricingType, Service, ServiceCategory};
//! use toolbelt_core::pricing::{EstimateCalculator, EstimateLineItem};
//!
//! let catalog = vec![Service {
//!     id: 1,
//!     name: "Drywall Installation".to_string(),
//!     category: ServiceCategory::Drywall,
//!     description: "Hang and finish drywall".to_string(),
//!     pricing: PricingType::Hourly,
//!     hourly_rate: Some(dec!(45)),
//!     flat_rate: None,
//!     estimated_duration_hours: dec!(2),
//!     is_active: true,
//! }];
//!
//! let calculator = EstimateCalculator::new(&catalog);
//! let totals = calculator
//!     .totals(&[EstimateLineItem { service_id: 1, quantity: 3 }])
//!     .unwrap();
//!
//! assert_eq!(totals.labor_cost, dec!(270));
//! assert_eq!(totals.total_duration_hours, dec!(6));
//! assert_eq!(totals.suggested_total, dec!(310.50));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PricingType, Service};

/// Fixed materials/overhead markup applied on top of labor cost.
pub const OVERHEAD_MARKUP: Decimal = dec!(0.15);

/// Errors that can occur while pricing an estimate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A line item references a service id that is not in the catalog.
    #[error("line item references unknown service {0}")]
    UnknownService(i64),

    /// An hourly service is missing its hourly rate.
    #[error("service {0} is hourly but carries no hourly rate")]
    MissingHourlyRate(i64),

    /// A flat-priced service is missing its flat rate.
    #[error("service {0} is flat-priced but carries no flat rate")]
    MissingFlatRate(i64),
}

/// A selected service and quantity while building an estimate. Ephemeral:
/// line items live only in the builder and are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateLineItem {
    pub service_id: i64,
    /// Always at least 1; the builder clamps on entry.
    pub quantity: u32,
}

/// Aggregate figures for a set of line items. Kept in full precision;
/// rounding happens at presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateTotals {
    pub labor_cost: Decimal,
    pub total_duration_hours: Decimal,
    pub suggested_total: Decimal,
}

impl EstimateTotals {
    pub const ZERO: EstimateTotals = EstimateTotals {
        labor_cost: Decimal::ZERO,
        total_duration_hours: Decimal::ZERO,
        suggested_total: Decimal::ZERO,
    };
}

/// Price of one unit of a service: hourly rate × estimated duration for
/// hourly services, the flat rate otherwise.
pub fn base_rate(service: &Service) -> Result<Decimal, PricingError> {
    match service.pricing {
        PricingType::Hourly => service
            .hourly_rate
            .map(|rate| rate * service.estimated_duration_hours)
            .ok_or(PricingError::MissingHourlyRate(service.id)),
        PricingType::Flat => service
            .flat_rate
            .ok_or(PricingError::MissingFlatRate(service.id)),
    }
}

/// Line total for a quantity of a service; linear in quantity.
pub fn line_total(service: &Service, quantity: u32) -> Result<Decimal, PricingError> {
    Ok(base_rate(service)? * Decimal::from(quantity))
}

/// Prices line items against a borrowed catalog slice.
#[derive(Debug, Clone)]
pub struct EstimateCalculator<'a> {
    catalog: &'a [Service],
}

impl<'a> EstimateCalculator<'a> {
    pub fn new(catalog: &'a [Service]) -> Self {
        Self { catalog }
    }

    pub fn service(&self, service_id: i64) -> Result<&'a Service, PricingError> {
        self.catalog
            .iter()
            .find(|s| s.id == service_id)
            .ok_or(PricingError::UnknownService(service_id))
    }

    /// Line total for one selected item.
    pub fn line_total(&self, item: &EstimateLineItem) -> Result<Decimal, PricingError> {
        line_total(self.service(item.service_id)?, item.quantity)
    }

    /// Aggregates labor cost, total duration and the marked-up suggested
    /// total. Empty input yields all zeros.
    pub fn totals(&self, items: &[EstimateLineItem]) -> Result<EstimateTotals, PricingError> {
        let mut labor_cost = Decimal::ZERO;
        let mut total_duration_hours = Decimal::ZERO;
        for item in items {
            let service = self.service(item.service_id)?;
            labor_cost += line_total(service, item.quantity)?;
            total_duration_hours +=
                service.estimated_duration_hours * Decimal::from(item.quantity);
        }
        Ok(EstimateTotals {
            labor_cost,
            total_duration_hours,
            suggested_total: labor_cost * (Decimal::ONE + OVERHEAD_MARKUP),
        })
    }
}
