pub mod builder;
pub mod db;
pub mod export;
pub mod metrics;
pub mod models;
pub mod pricing;
pub mod schedule;

pub use db::repository::{OpsRepository, RepositoryError};
pub use models::*;
