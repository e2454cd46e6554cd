use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a catalog service is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingType {
    Hourly,
    Flat,
}

impl PricingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Flat => "flat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hourly" => Some(Self::Hourly),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}

/// The fixed set of trade categories the catalog is organized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceCategory {
    Plumbing,
    Electrical,
    Carpentry,
    Painting,
    Hvac,
    Roofing,
    Flooring,
    Drywall,
    Landscaping,
    ApplianceRepair,
    GeneralRepair,
}

impl ServiceCategory {
    /// Display order used by the catalog screens.
    pub const ALL: [ServiceCategory; 11] = [
        Self::Plumbing,
        Self::Electrical,
        Self::Carpentry,
        Self::Painting,
        Self::Hvac,
        Self::Roofing,
        Self::Flooring,
        Self::Drywall,
        Self::Landscaping,
        Self::ApplianceRepair,
        Self::GeneralRepair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::Carpentry => "Carpentry",
            Self::Painting => "Painting",
            Self::Hvac => "HVAC",
            Self::Roofing => "Roofing",
            Self::Flooring => "Flooring",
            Self::Drywall => "Drywall",
            Self::Landscaping => "Landscaping",
            Self::ApplianceRepair => "Appliance Repair",
            Self::GeneralRepair => "General Repair",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Plumbing" => Some(Self::Plumbing),
            "Electrical" => Some(Self::Electrical),
            "Carpentry" => Some(Self::Carpentry),
            "Painting" => Some(Self::Painting),
            "HVAC" => Some(Self::Hvac),
            "Roofing" => Some(Self::Roofing),
            "Flooring" => Some(Self::Flooring),
            "Drywall" => Some(Self::Drywall),
            "Landscaping" => Some(Self::Landscaping),
            "Appliance Repair" => Some(Self::ApplianceRepair),
            "General Repair" => Some(Self::GeneralRepair),
            _ => None,
        }
    }
}

/// Errors raised when a catalog entry fails validation on create or edit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceValidationError {
    #[error("name must not be blank")]
    BlankName,

    #[error("description must not be blank")]
    BlankDescription,

    #[error("hourly service requires an hourly rate greater than zero")]
    InvalidHourlyRate,

    #[error("flat-priced service requires a flat rate greater than zero")]
    InvalidFlatRate,

    #[error("a service carries exactly one rate, matching its pricing type")]
    ConflictingRates,

    #[error("estimated duration must not be negative")]
    NegativeDuration,
}

/// A service the business offers, as listed in the catalog.
///
/// Jobs and estimates reference services by id only; deleting a service
/// leaves those references dangling and readers fall back to the stored
/// `service_type` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub category: ServiceCategory,
    pub description: String,
    pub pricing: PricingType,
    pub hourly_rate: Option<Decimal>,
    pub flat_rate: Option<Decimal>,
    pub estimated_duration_hours: Decimal,
    pub is_active: bool,
}

/// For creating new catalog entries (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub category: ServiceCategory,
    pub description: String,
    pub pricing: PricingType,
    pub hourly_rate: Option<Decimal>,
    pub flat_rate: Option<Decimal>,
    pub estimated_duration_hours: Decimal,
    pub is_active: bool,
}

impl NewService {
    /// Validates the invariants a catalog entry must hold: non-blank
    /// name/description, exactly one positive rate consistent with the
    /// pricing type, non-negative duration.
    pub fn validate(&self) -> Result<(), ServiceValidationError> {
        validate_service_fields(
            &self.name,
            &self.description,
            self.pricing,
            self.hourly_rate,
            self.flat_rate,
            self.estimated_duration_hours,
        )
    }
}

impl Service {
    /// Same rules as [`NewService::validate`], for edits of existing entries.
    pub fn validate(&self) -> Result<(), ServiceValidationError> {
        validate_service_fields(
            &self.name,
            &self.description,
            self.pricing,
            self.hourly_rate,
            self.flat_rate,
            self.estimated_duration_hours,
        )
    }
}

fn validate_service_fields(
    name: &str,
    description: &str,
    pricing: PricingType,
    hourly_rate: Option<Decimal>,
    flat_rate: Option<Decimal>,
    estimated_duration_hours: Decimal,
) -> Result<(), ServiceValidationError> {
    if name.trim().is_empty() {
        return Err(ServiceValidationError::BlankName);
    }
    if description.trim().is_empty() {
        return Err(ServiceValidationError::BlankDescription);
    }
    match pricing {
        PricingType::Hourly => {
            if flat_rate.is_some() {
                return Err(ServiceValidationError::ConflictingRates);
            }
            match hourly_rate {
                Some(rate) if rate > Decimal::ZERO => {}
                _ => return Err(ServiceValidationError::InvalidHourlyRate),
            }
        }
        PricingType::Flat => {
            if hourly_rate.is_some() {
                return Err(ServiceValidationError::ConflictingRates);
            }
            match flat_rate {
                Some(rate) if rate > Decimal::ZERO => {}
                _ => return Err(ServiceValidationError::InvalidFlatRate),
            }
        }
    }
    if estimated_duration_hours < Decimal::ZERO {
        return Err(ServiceValidationError::NegativeDuration);
    }
    Ok(())
}

/// Groups active services by category, in the fixed category display order.
/// Categories with no active services are omitted.
pub fn services_by_category(services: &[Service]) -> Vec<(ServiceCategory, Vec<&Service>)> {
    ServiceCategory::ALL
        .iter()
        .filter_map(|category| {
            let group: Vec<&Service> = services
                .iter()
                .filter(|s| s.category == *category && s.is_active)
                .collect();
            if group.is_empty() {
                None
            } else {
                Some((*category, group))
            }
        })
        .collect()
}

/// Case-insensitive catalog search over name, description and category.
/// An empty query matches everything.
pub fn search_services<'a>(services: &'a [Service], query: &str) -> Vec<&'a Service> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return services.iter().collect();
    }
    services
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&query)
                || s.description.to_lowercase().contains(&query)
                || s.category.as_str().to_lowercase().contains(&query)
        })
        .collect()
}
