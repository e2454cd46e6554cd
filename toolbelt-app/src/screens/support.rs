//! In-memory repository used by the screen tests: honest CRUD plus
//! switchable failure injection for the rollback paths.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use toolbelt_core::{
    Client, Communication, Job, NewClient, NewCommunication, NewJob, NewService, OpsRepository,
    RepositoryError, Service,
};

#[derive(Default)]
struct Inner {
    jobs: Vec<Job>,
    services: Vec<Service>,
    clients: Vec<Client>,
    communications: Vec<Communication>,
    next_job_id: i64,
    next_service_id: i64,
    next_client_id: i64,
    next_communication_id: i64,
}

pub struct MemoryRepository {
    inner: Mutex<Inner>,
    pub fail_job_updates: AtomicBool,
    pub fail_job_creates: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_job_id: 1,
                next_service_id: 1,
                next_client_id: 1,
                next_communication_id: 1,
                ..Inner::default()
            }),
            fail_job_updates: AtomicBool::new(false),
            fail_job_creates: AtomicBool::new(false),
        }
    }

    pub fn with_services(services: Vec<Service>) -> Self {
        let repo = Self::new();
        {
            let mut inner = repo.inner.lock().unwrap();
            inner.next_service_id = services.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            inner.services = services;
        }
        repo
    }

    fn injected() -> RepositoryError {
        RepositoryError::Database("injected failure".to_string())
    }
}

#[async_trait]
impl OpsRepository for MemoryRepository {
    async fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.inner.lock().unwrap().jobs.clone())
    }

    async fn get_job(&self, id: i64) -> Result<Job, RepositoryError> {
        self.inner
            .lock()
            .unwrap()
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        if self.fail_job_creates.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let id = inner.next_job_id;
        inner.next_job_id += 1;
        let job = Job {
            id,
            client_name: job.client_name,
            phone: job.phone,
            address: job.address,
            service_type: job.service_type,
            service_id: job.service_id,
            description: job.description,
            scheduled_at: job.scheduled_at,
            price: job.price,
            estimated_cost: job.estimated_cost,
            estimated_duration_hours: job.estimated_duration_hours,
            status: job.status,
            completed_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
            notes: Vec::new(),
            photos: Vec::new(),
            services: job.services,
        };
        inner.jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, job: &Job) -> Result<Job, RepositoryError> {
        if self.fail_job_updates.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = job.clone();
        updated.updated_at = Utc::now();
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete_job(&self, id: i64) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let index = inner
            .jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or(RepositoryError::NotFound)?;
        inner.jobs.remove(index);
        Ok(())
    }

    async fn list_services(&self) -> Result<Vec<Service>, RepositoryError> {
        Ok(self.inner.lock().unwrap().services.clone())
    }

    async fn get_service(&self, id: i64) -> Result<Service, RepositoryError> {
        self.inner
            .lock()
            .unwrap()
            .services
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_service(&self, service: NewService) -> Result<Service, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_service_id;
        inner.next_service_id += 1;
        let service = Service {
            id,
            name: service.name,
            category: service.category,
            description: service.description,
            pricing: service.pricing,
            hourly_rate: service.hourly_rate,
            flat_rate: service.flat_rate,
            estimated_duration_hours: service.estimated_duration_hours,
            is_active: service.is_active,
        };
        inner.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(&self, service: &Service) -> Result<Service, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .services
            .iter_mut()
            .find(|s| s.id == service.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = service.clone();
        Ok(service.clone())
    }

    async fn delete_service(&self, id: i64) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let index = inner
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        inner.services.remove(index);
        Ok(())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        Ok(self.inner.lock().unwrap().clients.clone())
    }

    async fn get_client(&self, id: i64) -> Result<Client, RepositoryError> {
        self.inner
            .lock()
            .unwrap()
            .clients
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_client(&self, client: NewClient) -> Result<Client, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let id = inner.next_client_id;
        inner.next_client_id += 1;
        let client = Client {
            id,
            name: client.name,
            email: client.email,
            phone: client.phone,
            address: client.address,
            status: client.status,
            total_jobs: 0,
            total_spent: Decimal::ZERO,
            client_since: now,
            last_contact: now,
        };
        inner.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, client: &Client) -> Result<Client, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .clients
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = client.clone();
        Ok(client.clone())
    }

    async fn delete_client(&self, id: i64) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let index = inner
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        inner.clients.remove(index);
        inner.communications.retain(|c| c.client_id != id);
        Ok(())
    }

    async fn list_communications(
        &self,
        client_id: i64,
    ) -> Result<Vec<Communication>, RepositoryError> {
        let mut communications: Vec<Communication> = self
            .inner
            .lock()
            .unwrap()
            .communications
            .iter()
            .filter(|c| c.client_id == client_id)
            .cloned()
            .collect();
        communications.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(communications)
    }

    async fn create_communication(
        &self,
        communication: NewCommunication,
    ) -> Result<Communication, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_communication_id;
        inner.next_communication_id += 1;
        let communication = Communication {
            id,
            client_id: communication.client_id,
            kind: communication.kind,
            subject: communication.subject,
            message: communication.message,
            direction: communication.direction,
            date: Utc::now(),
        };
        inner.communications.push(communication.clone());
        Ok(communication)
    }
}
