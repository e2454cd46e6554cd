//! Per-screen controllers.
//!
//! Each screen owns the collections it fetched for the duration of its
//! mount; navigating away and back constructs a fresh screen and refetches.
//! There is no cross-screen cache. Local validation failures surface
//! without contacting the store; store failures leave local state as the
//! operation found it (the calendar drop rolls its optimistic move back).

mod calendar;
mod clients;
mod dashboard;
mod estimate;
mod jobs;
mod reports;

#[cfg(test)]
pub(crate) mod support;

pub use calendar::CalendarScreen;
pub use clients::ClientsScreen;
pub use dashboard::DashboardScreen;
pub use estimate::EstimateScreen;
pub use jobs::JobsScreen;
pub use reports::ReportsScreen;

use thiserror::Error;
use toolbelt_core::builder::BuilderError;
use toolbelt_core::pricing::PricingError;
use toolbelt_core::schedule::ScheduleError;
use toolbelt_core::{JobError, RepositoryError};

/// Everything a screen action can fail with. Each variant is scoped to the
/// single action that raised it; the screen stays usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("job {0} is not loaded on this screen")]
    JobNotLoaded(i64),

    #[error("client {0} is not loaded on this screen")]
    ClientNotLoaded(i64),

    #[error("form validation failed: {}", .0.join("; "))]
    Form(Vec<String>),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
