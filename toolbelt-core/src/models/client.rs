use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    Active,
    Inactive,
    Lead,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Lead => "Lead",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            "Lead" => Some(Self::Lead),
            _ => None,
        }
    }
}

/// A client of the business.
///
/// `total_jobs` and `total_spent` are denormalized running totals. They are
/// maintained only by explicit updates (see `ClientsScreen::record_job_payment`)
/// and are never recomputed from the job history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: ClientStatus,
    pub total_jobs: u32,
    pub total_spent: Decimal,
    pub client_since: DateTime<Utc>,
    /// Bumped whenever a communication is logged for this client.
    pub last_contact: DateTime<Utc>,
}

/// For creating new clients. Totals start at zero; `client_since` and
/// `last_contact` are stamped at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: ClientStatus,
}
