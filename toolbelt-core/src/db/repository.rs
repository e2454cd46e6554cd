use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Client, Communication, Job, NewClient, NewCommunication, NewJob, NewService, Service,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// The record-store boundary the core depends on: plain CRUD over the four
/// entity collections, one independent request per mutation, last write
/// wins. Field-name translation for any concrete store happens behind this
/// trait, never in the core.
///
/// `update_*` takes the full record and returns the stored row (with
/// `updated_at` freshly stamped) so callers can reconcile local state.
#[async_trait]
pub trait OpsRepository: Send + Sync {
    // Jobs
    async fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    async fn get_job(&self, id: i64) -> Result<Job, RepositoryError>;
    async fn create_job(&self, job: NewJob) -> Result<Job, RepositoryError>;
    async fn update_job(&self, job: &Job) -> Result<Job, RepositoryError>;
    async fn delete_job(&self, id: i64) -> Result<(), RepositoryError>;

    // Service catalog
    async fn list_services(&self) -> Result<Vec<Service>, RepositoryError>;
    async fn get_service(&self, id: i64) -> Result<Service, RepositoryError>;
    async fn create_service(&self, service: NewService) -> Result<Service, RepositoryError>;
    async fn update_service(&self, service: &Service) -> Result<Service, RepositoryError>;
    /// Deleting a service leaves jobs that reference it untouched; their
    /// `service_id` simply dangles.
    async fn delete_service(&self, id: i64) -> Result<(), RepositoryError>;

    // Clients
    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError>;
    async fn get_client(&self, id: i64) -> Result<Client, RepositoryError>;
    async fn create_client(&self, client: NewClient) -> Result<Client, RepositoryError>;
    async fn update_client(&self, client: &Client) -> Result<Client, RepositoryError>;
    /// Deleting a client also removes its communications.
    async fn delete_client(&self, id: i64) -> Result<(), RepositoryError>;

    // Communications
    async fn list_communications(
        &self,
        client_id: i64,
    ) -> Result<Vec<Communication>, RepositoryError>;
    async fn create_communication(
        &self,
        communication: NewCommunication,
    ) -> Result<Communication, RepositoryError>;
}
