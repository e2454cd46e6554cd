use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use toolbelt_core::{
    NewService, OpsRepository, PricingType, RepositoryError, Service, ServiceCategory,
    ServiceValidationError,
};
use thiserror::Error;

/// Errors that can occur when loading catalog data.
#[derive(Debug, Error)]
pub enum CatalogLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Unknown pricing type '{0}' (expected 'hourly' or 'flat')")]
    UnknownPricingType(String),

    #[error("Invalid service '{name}': {source}")]
    InvalidService {
        name: String,
        source: ServiceValidationError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for CatalogLoaderError {
    fn from(err: csv::Error) -> Self {
        CatalogLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the catalog CSV file.
///
/// Columns:
/// - `name`, `category`, `description`
/// - `pricing_type`: `hourly` or `flat`
/// - `hourly_rate` / `flat_rate`: exactly one non-empty, matching the type
/// - `estimated_duration_hours`
/// - `is_active`: `true`/`false`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogRecord {
    pub name: String,
    pub category: String,
    pub description: String,
    pub pricing_type: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub hourly_rate: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub flat_rate: Option<Decimal>,
    pub estimated_duration_hours: Decimal,
    pub is_active: bool,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl CatalogRecord {
    /// Converts the raw record into a validated [`NewService`].
    pub fn into_new_service(self) -> Result<NewService, CatalogLoaderError> {
        let category = ServiceCategory::parse(&self.category)
            .ok_or_else(|| CatalogLoaderError::UnknownCategory(self.category.clone()))?;
        let pricing = PricingType::parse(&self.pricing_type)
            .ok_or_else(|| CatalogLoaderError::UnknownPricingType(self.pricing_type.clone()))?;
        let service = NewService {
            name: self.name,
            category,
            description: self.description,
            pricing,
            hourly_rate: self.hourly_rate,
            flat_rate: self.flat_rate,
            estimated_duration_hours: self.estimated_duration_hours,
            is_active: self.is_active,
        };
        service
            .validate()
            .map_err(|source| CatalogLoaderError::InvalidService {
                name: service.name.clone(),
                source,
            })?;
        Ok(service)
    }
}

/// Loader for service catalog data from CSV files.
///
/// Reads CSV data and inserts it through the [`OpsRepository`] trait, so it
/// works with any store backend.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse catalog records from a CSV reader. The reader can be any type
    /// that implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<CatalogRecord>, CatalogLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            let record: CatalogRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Validate the parsed records and insert each as a catalog service.
    /// Returns the created services. Fails fast on the first bad record so
    /// a typo'd file is not half-loaded silently.
    pub async fn load(
        repository: &dyn OpsRepository,
        records: Vec<CatalogRecord>,
    ) -> Result<Vec<Service>, CatalogLoaderError> {
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            let service = record.into_new_service()?;
            created.push(repository.create_service(service).await?);
        }
        Ok(created)
    }
}
