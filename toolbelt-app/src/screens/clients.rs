use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use toolbelt_core::{
    Client, Communication, NewClient, NewCommunication, OpsRepository, RepositoryError,
};

use super::ScreenError;

/// The clients screen: client CRUD, the communication log, and the explicit
/// updates that maintain the denormalized job/spend counters.
pub struct ClientsScreen {
    repo: Arc<dyn OpsRepository>,
    clients: Vec<Client>,
}

impl ClientsScreen {
    pub async fn open(repo: Arc<dyn OpsRepository>) -> Result<Self, RepositoryError> {
        let clients = repo.list_clients().await?;
        Ok(Self { repo, clients })
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn client(&self, client_id: i64) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == client_id)
    }

    fn index_of(&self, client_id: i64) -> Result<usize, ScreenError> {
        self.clients
            .iter()
            .position(|client| client.id == client_id)
            .ok_or(ScreenError::ClientNotLoaded(client_id))
    }

    pub async fn create_client(&mut self, client: NewClient) -> Result<&Client, ScreenError> {
        let created = self.repo.create_client(client).await?;
        info!(client_id = created.id, "client created");
        self.clients.push(created);
        Ok(self.clients.last().expect("client was just pushed"))
    }

    pub async fn update_client(&mut self, client: Client) -> Result<&Client, ScreenError> {
        let index = self.index_of(client.id)?;
        let stored = self.repo.update_client(&client).await?;
        self.clients[index] = stored;
        Ok(&self.clients[index])
    }

    pub async fn delete_client(&mut self, client_id: i64) -> Result<(), ScreenError> {
        let index = self.index_of(client_id)?;
        self.repo.delete_client(client_id).await?;
        self.clients.remove(index);
        info!(client_id, "client deleted");
        Ok(())
    }

    pub async fn communications(
        &self,
        client_id: i64,
    ) -> Result<Vec<Communication>, ScreenError> {
        Ok(self.repo.list_communications(client_id).await?)
    }

    /// Logs a touchpoint and bumps the client's `last_contact` to the
    /// communication's date.
    pub async fn log_communication(
        &mut self,
        communication: NewCommunication,
    ) -> Result<Communication, ScreenError> {
        let index = self.index_of(communication.client_id)?;
        let logged = self.repo.create_communication(communication).await?;

        let mut client = self.clients[index].clone();
        client.last_contact = logged.date;
        let stored = self.repo.update_client(&client).await?;
        self.clients[index] = stored;

        Ok(logged)
    }

    /// Explicitly bumps the denormalized counters when a job for this
    /// client is paid out. Nothing recomputes these from job history; this
    /// action is the only writer.
    pub async fn record_job_payment(
        &mut self,
        client_id: i64,
        amount: Decimal,
    ) -> Result<&Client, ScreenError> {
        let index = self.index_of(client_id)?;
        let mut client = self.clients[index].clone();
        client.total_jobs += 1;
        client.total_spent += amount;
        let stored = self.repo.update_client(&client).await?;
        self.clients[index] = stored;
        Ok(&self.clients[index])
    }
}
