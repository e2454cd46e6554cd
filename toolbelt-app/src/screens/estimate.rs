use std::sync::Arc;

use chrono::Local;
use tracing::info;
use toolbelt_core::builder::{BuilderAction, EstimateBuilder};
use toolbelt_core::export::EstimateDocument;
use toolbelt_core::models::services_by_category;
use toolbelt_core::pricing::EstimateTotals;
use toolbelt_core::{Job, OpsRepository, RepositoryError, Service, ServiceCategory};

use super::ScreenError;

/// The quick-estimate modal: catalog selection, live totals, and the
/// busy-guarded convert/print/email actions.
pub struct EstimateScreen {
    repo: Arc<dyn OpsRepository>,
    catalog: Vec<Service>,
    builder: EstimateBuilder,
}

impl EstimateScreen {
    pub async fn open(repo: Arc<dyn OpsRepository>) -> Result<Self, RepositoryError> {
        let catalog = repo.list_services().await?;
        Ok(Self {
            repo,
            catalog,
            builder: EstimateBuilder::new(),
        })
    }

    /// Active services grouped for the selection panel.
    pub fn catalog_by_category(&self) -> Vec<(ServiceCategory, Vec<&Service>)> {
        services_by_category(&self.catalog)
    }

    pub fn builder(&self) -> &EstimateBuilder {
        &self.builder
    }

    pub fn toggle_service(&mut self, service_id: i64) {
        self.builder.toggle_service(service_id);
    }

    pub fn set_quantity(&mut self, service_id: i64, quantity: i64) {
        self.builder.set_quantity(service_id, quantity);
    }

    /// Live summary figures for the side panel.
    pub fn totals(&self) -> Result<EstimateTotals, ScreenError> {
        Ok(self.builder.totals(&self.catalog)?)
    }

    /// Converts the selection into a persisted job. On success the
    /// selection resets (the modal closes); on store failure it is kept so
    /// the user can retry.
    pub async fn convert_to_job(&mut self) -> Result<Job, ScreenError> {
        self.builder.begin(BuilderAction::Converting)?;
        let new_job = match self
            .builder
            .build_job(&self.catalog, Local::now().naive_local())
        {
            Ok(new_job) => new_job,
            Err(error) => {
                self.builder.cancel();
                return Err(error.into());
            }
        };
        match self.repo.create_job(new_job).await {
            Ok(job) => {
                self.builder.complete();
                info!(job_id = job.id, "estimate converted to job");
                Ok(job)
            }
            Err(error) => {
                self.builder.cancel();
                Err(error.into())
            }
        }
    }

    /// Renders the printable document for the current selection. Rendering
    /// is local; the busy guard still applies so a slow print dialog cannot
    /// double-submit.
    pub fn print_document(&mut self) -> Result<String, ScreenError> {
        self.builder.begin(BuilderAction::Printing)?;
        let result = EstimateDocument::new(&self.catalog, self.builder.line_items());
        match result {
            Ok(document) => {
                self.builder.complete();
                Ok(document.to_html())
            }
            Err(error) => {
                self.builder.cancel();
                Err(error.into())
            }
        }
    }

    /// Renders the email subject and body for the current selection.
    pub fn email_document(&mut self) -> Result<(String, String), ScreenError> {
        self.builder.begin(BuilderAction::Emailing)?;
        let result = EstimateDocument::new(&self.catalog, self.builder.line_items());
        match result {
            Ok(document) => {
                self.builder.complete();
                Ok(document.to_email())
            }
            Err(error) => {
                self.builder.cancel();
                Err(error.into())
            }
        }
    }
}
