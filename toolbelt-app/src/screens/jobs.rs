use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use toolbelt_core::{Job, JobStatus, OpsRepository, PhotoUpload, RepositoryError};

use crate::models::JobFormModel;

use super::ScreenError;

/// The jobs screen: full CRUD over jobs plus the note and photo operations.
/// Every mutation, notes and photos included, flows through the repository's
/// ordinary `update_job` path; there is no side channel.
pub struct JobsScreen {
    repo: Arc<dyn OpsRepository>,
    jobs: Vec<Job>,
}

impl JobsScreen {
    pub async fn open(repo: Arc<dyn OpsRepository>) -> Result<Self, RepositoryError> {
        let jobs = repo.list_jobs().await?;
        Ok(Self { repo, jobs })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, job_id: i64) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == job_id)
    }

    fn index_of(&self, job_id: i64) -> Result<usize, ScreenError> {
        self.jobs
            .iter()
            .position(|job| job.id == job_id)
            .ok_or(ScreenError::JobNotLoaded(job_id))
    }

    /// Persists a mutation of one loaded job. The closure runs against a
    /// clone: when it fails with a local validation error the store is
    /// never contacted and the screen keeps its previous state.
    async fn persist_change<F>(&mut self, job_id: i64, change: F) -> Result<&Job, ScreenError>
    where
        F: FnOnce(&mut Job) -> Result<(), ScreenError>,
    {
        let index = self.index_of(job_id)?;
        let mut updated = self.jobs[index].clone();
        change(&mut updated)?;
        let stored = self.repo.update_job(&updated).await?;
        self.jobs[index] = stored;
        Ok(&self.jobs[index])
    }

    /// Creates a job from the form. Validation errors surface as one list
    /// without touching the store.
    pub async fn submit_new(&mut self, form: &JobFormModel) -> Result<&Job, ScreenError> {
        let new_job = form.to_new_job().map_err(ScreenError::Form)?;
        let created = self.repo.create_job(new_job).await?;
        info!(job_id = created.id, "job created");
        self.jobs.push(created);
        Ok(self.jobs.last().expect("job was just pushed"))
    }

    /// Applies the form to an existing job and persists it.
    pub async fn submit_edit(
        &mut self,
        job_id: i64,
        form: &JobFormModel,
    ) -> Result<&Job, ScreenError> {
        self.persist_change(job_id, |job| {
            form.apply_to(job).map_err(ScreenError::Form)
        })
        .await
    }

    pub async fn delete_job(&mut self, job_id: i64) -> Result<(), ScreenError> {
        let index = self.index_of(job_id)?;
        self.repo.delete_job(job_id).await?;
        self.jobs.remove(index);
        info!(job_id, "job deleted");
        Ok(())
    }

    /// Advances a job one step along the status lifecycle.
    pub async fn advance_status(&mut self, job_id: i64) -> Result<JobStatus, ScreenError> {
        let job = self
            .persist_change(job_id, |job| {
                job.advance_status(Utc::now())?;
                Ok(())
            })
            .await?;
        Ok(job.status)
    }

    pub async fn add_note(&mut self, job_id: i64, text: &str) -> Result<(), ScreenError> {
        self.persist_change(job_id, |job| {
            job.add_note(text, Utc::now())?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn update_note(
        &mut self,
        job_id: i64,
        note_id: i64,
        text: &str,
    ) -> Result<(), ScreenError> {
        self.persist_change(job_id, |job| {
            job.update_note(note_id, text, Utc::now())?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn delete_note(&mut self, job_id: i64, note_id: i64) -> Result<(), ScreenError> {
        self.persist_change(job_id, |job| {
            job.delete_note(note_id, Utc::now())?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn add_photo(
        &mut self,
        job_id: i64,
        upload: PhotoUpload,
    ) -> Result<(), ScreenError> {
        self.persist_change(job_id, |job| {
            job.add_photo(upload, Utc::now())?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn delete_photo(&mut self, job_id: i64, photo_id: i64) -> Result<(), ScreenError> {
        self.persist_change(job_id, |job| {
            job.delete_photo(photo_id, Utc::now())?;
            Ok(())
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use toolbelt_core::JobError;

    use crate::screens::support::MemoryRepository;

    use super::*;

    fn form() -> JobFormModel {
        JobFormModel {
            client_name: "Dana Whitfield".to_string(),
            phone: "555-0134".to_string(),
            address: "18 Alder Ct".to_string(),
            service_type: "Drywall".to_string(),
            service_id: None,
            description: "Patch two wall sections".to_string(),
            scheduled_date: "2025-06-16".to_string(),
            price: String::new(),
        }
    }

    async fn screen_with_one_job() -> (Arc<MemoryRepository>, JobsScreen, i64) {
        let repo = Arc::new(MemoryRepository::new());
        let mut screen = JobsScreen::open(repo.clone()).await.unwrap();
        let id = screen.submit_new(&form()).await.unwrap().id;
        (repo, screen, id)
    }

    #[tokio::test]
    async fn submit_new_creates_scheduled_tbd_job() {
        let (_repo, screen, id) = screen_with_one_job().await;

        let job = screen.job(id).unwrap();
        assert_eq!(job.status, JobStatus::Scheduled);
        assert_eq!(job.price, None);
    }

    #[tokio::test]
    async fn submit_new_with_invalid_form_never_contacts_store() {
        let repo = Arc::new(MemoryRepository::new());
        let mut screen = JobsScreen::open(repo.clone()).await.unwrap();
        let mut bad = form();
        bad.client_name = String::new();

        let result = screen.submit_new(&bad).await;

        assert!(matches!(result, Err(ScreenError::Form(_))));
        assert_eq!(repo.list_jobs().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn blank_note_is_rejected_and_store_untouched() {
        let (repo, mut screen, id) = screen_with_one_job().await;
        // Any store call would now fail loudly.
        repo.fail_job_updates
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let result = screen.add_note(id, "   ").await;

        assert_eq!(result, Err(ScreenError::Job(JobError::BlankNote)));
        assert_eq!(screen.job(id).unwrap().notes.len(), 0);
    }

    #[tokio::test]
    async fn note_lifecycle_persists_through_update_job() {
        let (repo, mut screen, id) = screen_with_one_job().await;

        screen.add_note(id, "Bring extra mud").await.unwrap();
        assert_eq!(repo.get_job(id).await.unwrap().notes.len(), 1);

        screen.update_note(id, 1, "Bring extra mud and tape").await.unwrap();
        assert_eq!(
            repo.get_job(id).await.unwrap().notes[0].text,
            "Bring extra mud and tape"
        );

        screen.delete_note(id, 1).await.unwrap();
        assert_eq!(repo.get_job(id).await.unwrap().notes.len(), 0);
    }

    #[tokio::test]
    async fn failed_store_update_keeps_local_state_unchanged() {
        let (repo, mut screen, id) = screen_with_one_job().await;
        repo.fail_job_updates
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let result = screen.add_note(id, "will not stick").await;

        assert!(matches!(result, Err(ScreenError::Repository(_))));
        // The clone absorbed the mutation; the screen copy is untouched.
        assert_eq!(screen.job(id).unwrap().notes.len(), 0);
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let (_repo, mut screen, id) = screen_with_one_job().await;

        let result = screen
            .add_photo(
                id,
                PhotoUpload {
                    name: "huge.png".to_string(),
                    url: "photos/huge.png".to_string(),
                    size_bytes: 6_000_000,
                    content_type: "image/png".to_string(),
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(ScreenError::Job(JobError::PhotoTooLarge { .. }))
        ));
        assert_eq!(screen.job(id).unwrap().photos.len(), 0);
    }

    #[tokio::test]
    async fn accepted_photo_round_trips() {
        let (repo, mut screen, id) = screen_with_one_job().await;

        screen
            .add_photo(
                id,
                PhotoUpload {
                    name: "before.png".to_string(),
                    url: "photos/before.png".to_string(),
                    size_bytes: 4_000_000,
                    content_type: "image/png".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(repo.get_job(id).await.unwrap().photos.len(), 1);
    }

    #[tokio::test]
    async fn status_never_regresses_through_screen_actions() {
        let (_repo, mut screen, id) = screen_with_one_job().await;

        assert_eq!(screen.advance_status(id).await.unwrap(), JobStatus::InProgress);
        assert_eq!(screen.advance_status(id).await.unwrap(), JobStatus::Completed);
        assert_eq!(screen.advance_status(id).await.unwrap(), JobStatus::Paid);
        assert!(screen.advance_status(id).await.is_err());
        assert_eq!(screen.job(id).unwrap().status, JobStatus::Paid);
    }

    #[tokio::test]
    async fn completed_at_survives_paid_transition() {
        let (_repo, mut screen, id) = screen_with_one_job().await;
        screen.advance_status(id).await.unwrap();
        screen.advance_status(id).await.unwrap();
        let completed_at = screen.job(id).unwrap().completed_at;
        assert!(completed_at.is_some());

        screen.advance_status(id).await.unwrap();

        assert_eq!(screen.job(id).unwrap().completed_at, completed_at);
        assert!(screen.job(id).unwrap().paid_at.is_some());
    }

    #[tokio::test]
    async fn edit_form_updates_stored_job() {
        let (repo, mut screen, id) = screen_with_one_job().await;
        let mut edited = form();
        edited.price = "275".to_string();

        screen.submit_edit(id, &edited).await.unwrap();

        let stored = repo.get_job(id).await.unwrap();
        assert_eq!(stored.price, Some(rust_decimal_macros::dec!(275)));
    }

    #[tokio::test]
    async fn delete_job_removes_from_screen_and_store() {
        let (repo, mut screen, id) = screen_with_one_job().await;

        screen.delete_job(id).await.unwrap();

        assert!(screen.job(id).is_none());
        assert_eq!(repo.list_jobs().await.unwrap().len(), 0);
    }
}
