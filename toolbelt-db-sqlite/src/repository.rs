use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{
    FromRow,
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use toolbelt_core::{
    Client, ClientStatus, Communication, CommunicationDirection, Job, JobNote, JobPhoto,
    JobServiceLine, JobStatus, NewClient, NewCommunication, NewJob, NewService, OpsRepository,
    PricingType, RepositoryError, Service, ServiceCategory,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        // An in-memory database exists per connection; cap the pool at one
        // so every caller sees the same data.
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new().max_connections(1)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = options
            .connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ── row types ────────────────────────────────────────────────────────────

#[derive(FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    category: String,
    description: String,
    pricing_type: String,
    hourly_rate: Option<String>,
    flat_rate: Option<String>,
    estimated_duration_hours: String,
    is_active: bool,
}

impl TryFrom<ServiceRow> for Service {
    type Error = RepositoryError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        Ok(Service {
            id: row.id,
            name: row.name,
            category: parse_category(&row.category)?,
            description: row.description,
            pricing: parse_pricing(&row.pricing_type)?,
            hourly_rate: parse_optional_decimal(&row.hourly_rate)?,
            flat_rate: parse_optional_decimal(&row.flat_rate)?,
            estimated_duration_hours: parse_decimal(&row.estimated_duration_hours)?,
            is_active: row.is_active,
        })
    }
}

#[derive(FromRow)]
struct JobRow {
    id: i64,
    client_name: String,
    phone: String,
    address: String,
    service_type: String,
    service_id: Option<i64>,
    description: String,
    scheduled_at: String,
    price: Option<String>,
    estimated_cost: Option<String>,
    estimated_duration_hours: Option<String>,
    status: String,
    completed_at: Option<String>,
    paid_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl JobRow {
    /// Builds the domain job; child collections are loaded separately.
    fn into_job(
        self,
        notes: Vec<JobNote>,
        photos: Vec<JobPhoto>,
        services: Vec<JobServiceLine>,
    ) -> Result<Job, RepositoryError> {
        Ok(Job {
            id: self.id,
            client_name: self.client_name,
            phone: self.phone,
            address: self.address,
            service_type: self.service_type,
            service_id: self.service_id,
            description: self.description,
            scheduled_at: parse_naive_datetime(&self.scheduled_at)?,
            price: parse_optional_decimal(&self.price)?,
            estimated_cost: parse_optional_decimal(&self.estimated_cost)?,
            estimated_duration_hours: parse_optional_decimal(&self.estimated_duration_hours)?,
            status: parse_status(&self.status)?,
            completed_at: parse_optional_datetime(&self.completed_at)?,
            paid_at: parse_optional_datetime(&self.paid_at)?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            notes,
            photos,
            services,
        })
    }
}

#[derive(FromRow)]
struct JobNoteRow {
    id: i64,
    text: String,
    created_at: String,
    updated_at: Option<String>,
}

impl TryFrom<JobNoteRow> for JobNote {
    type Error = RepositoryError;

    fn try_from(row: JobNoteRow) -> Result<Self, Self::Error> {
        Ok(JobNote {
            id: row.id,
            text: row.text,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_optional_datetime(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct JobPhotoRow {
    id: i64,
    name: String,
    url: String,
    size_bytes: i64,
    content_type: String,
    created_at: String,
}

impl TryFrom<JobPhotoRow> for JobPhoto {
    type Error = RepositoryError;

    fn try_from(row: JobPhotoRow) -> Result<Self, Self::Error> {
        Ok(JobPhoto {
            id: row.id,
            name: row.name,
            url: row.url,
            size_bytes: row.size_bytes.max(0) as u64,
            content_type: row.content_type,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct JobServiceLineRow {
    service_id: i64,
    service_name: String,
    quantity: i64,
    rate: String,
    pricing_type: String,
    estimated_duration_hours: String,
}

impl TryFrom<JobServiceLineRow> for JobServiceLine {
    type Error = RepositoryError;

    fn try_from(row: JobServiceLineRow) -> Result<Self, Self::Error> {
        Ok(JobServiceLine {
            service_id: row.service_id,
            service_name: row.service_name,
            quantity: row.quantity.max(0) as u32,
            rate: parse_decimal(&row.rate)?,
            pricing: parse_pricing(&row.pricing_type)?,
            estimated_duration_hours: parse_decimal(&row.estimated_duration_hours)?,
        })
    }
}

#[derive(FromRow)]
struct ClientRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    address: String,
    status: String,
    total_jobs: i64,
    total_spent: String,
    client_since: String,
    last_contact: String,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let status = ClientStatus::parse(&row.status).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid client status: {}", row.status))
        })?;
        Ok(Client {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            status,
            total_jobs: row.total_jobs.max(0) as u32,
            total_spent: parse_decimal(&row.total_spent)?,
            client_since: parse_datetime(&row.client_since)?,
            last_contact: parse_datetime(&row.last_contact)?,
        })
    }
}

#[derive(FromRow)]
struct CommunicationRow {
    id: i64,
    client_id: i64,
    kind: String,
    subject: String,
    message: String,
    direction: String,
    date: String,
}

impl TryFrom<CommunicationRow> for Communication {
    type Error = RepositoryError;

    fn try_from(row: CommunicationRow) -> Result<Self, Self::Error> {
        let direction = CommunicationDirection::parse(&row.direction).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid direction: {}", row.direction))
        })?;
        Ok(Communication {
            id: row.id,
            client_id: row.client_id,
            kind: row.kind,
            subject: row.subject,
            message: row.message,
            direction,
            date: parse_datetime(&row.date)?,
        })
    }
}

// ── parsing helpers ──────────────────────────────────────────────────────

fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    s.parse::<Decimal>()
        .map_err(|e| RepositoryError::Database(format!("Failed to parse decimal '{}': {}", s, e)))
}

fn parse_optional_decimal(s: &Option<String>) -> Result<Option<Decimal>, RepositoryError> {
    s.as_ref().map(|s| parse_decimal(s)).transpose()
}

fn parse_naive_datetime(s: &str) -> Result<NaiveDateTime, RepositoryError> {
    // SQLite stores timestamps in various formats, try common ones
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    parse_naive_datetime(s).map(|naive| naive.and_utc())
}

fn parse_optional_datetime(s: &Option<String>) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    s.as_ref().map(|s| parse_datetime(s)).transpose()
}

fn parse_status(s: &str) -> Result<JobStatus, RepositoryError> {
    JobStatus::parse(s)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid job status: {}", s)))
}

fn parse_category(s: &str) -> Result<ServiceCategory, RepositoryError> {
    ServiceCategory::parse(s)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid service category: {}", s)))
}

fn parse_pricing(s: &str) -> Result<PricingType, RepositoryError> {
    PricingType::parse(s)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid pricing type: {}", s)))
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn fmt_utc(t: DateTime<Utc>) -> String {
    t.format(TS_FORMAT).to_string()
}

fn fmt_opt_utc(t: Option<DateTime<Utc>>) -> Option<String> {
    t.map(fmt_utc)
}

fn fmt_naive(t: NaiveDateTime) -> String {
    t.format(TS_FORMAT).to_string()
}

// ── job child collections ────────────────────────────────────────────────

impl SqliteRepository {
    async fn load_job_children(
        &self,
        job_id: i64,
    ) -> Result<(Vec<JobNote>, Vec<JobPhoto>, Vec<JobServiceLine>), RepositoryError> {
        let note_rows: Vec<JobNoteRow> = sqlx::query_as(
            "SELECT id, text, created_at, updated_at FROM job_notes
             WHERE job_id = ? ORDER BY id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let photo_rows: Vec<JobPhotoRow> = sqlx::query_as(
            "SELECT id, name, url, size_bytes, content_type, created_at FROM job_photos
             WHERE job_id = ? ORDER BY id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let line_rows: Vec<JobServiceLineRow> = sqlx::query_as(
            "SELECT service_id, service_name, quantity, rate, pricing_type,
                    estimated_duration_hours
             FROM job_service_lines WHERE job_id = ? ORDER BY position",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let notes = note_rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        let photos = photo_rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        let services = line_rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok((notes, photos, services))
    }

    /// Rewrites a job's child rows inside the given transaction. Children
    /// are replaced wholesale: the job owns them exclusively and the whole
    /// record is the unit of update.
    async fn write_job_children(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        job_id: i64,
        notes: &[JobNote],
        photos: &[JobPhoto],
        services: &[JobServiceLine],
    ) -> Result<(), RepositoryError> {
        for table in ["job_notes", "job_photos", "job_service_lines"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE job_id = ?"))
                .bind(job_id)
                .execute(&mut **tx)
                .await
                .map_err(db_err)?;
        }

        for note in notes {
            sqlx::query(
                "INSERT INTO job_notes (job_id, id, text, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(job_id)
            .bind(note.id)
            .bind(&note.text)
            .bind(fmt_utc(note.created_at))
            .bind(fmt_opt_utc(note.updated_at))
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
        }

        for photo in photos {
            sqlx::query(
                "INSERT INTO job_photos (job_id, id, name, url, size_bytes, content_type, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(job_id)
            .bind(photo.id)
            .bind(&photo.name)
            .bind(&photo.url)
            .bind(photo.size_bytes as i64)
            .bind(&photo.content_type)
            .bind(fmt_utc(photo.created_at))
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
        }

        for (position, line) in services.iter().enumerate() {
            sqlx::query(
                "INSERT INTO job_service_lines
                   (job_id, position, service_id, service_name, quantity, rate,
                    pricing_type, estimated_duration_hours)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(job_id)
            .bind(position as i64)
            .bind(line.service_id)
            .bind(&line.service_name)
            .bind(line.quantity as i64)
            .bind(line.rate.to_string())
            .bind(line.pricing.as_str())
            .bind(line.estimated_duration_hours.to_string())
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
        }

        Ok(())
    }
}

const JOB_COLUMNS: &str = "id, client_name, phone, address, service_type, service_id, \
     description, scheduled_at, price, estimated_cost, estimated_duration_hours, \
     status, completed_at, paid_at, created_at, updated_at";

#[async_trait]
impl OpsRepository for SqliteRepository {
    // ── jobs ─────────────────────────────────────────────────────────────

    async fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        let rows: Vec<JobRow> =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY scheduled_at"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            let (notes, photos, services) = self.load_job_children(row.id).await?;
            jobs.push(row.into_job(notes, photos, services)?);
        }
        Ok(jobs)
    }

    async fn get_job(&self, id: i64) -> Result<Job, RepositoryError> {
        let row: JobRow = sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        let (notes, photos, services) = self.load_job_children(id).await?;
        row.into_job(notes, photos, services)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        let now = fmt_utc(Utc::now());
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO jobs (
                client_name, phone, address, service_type, service_id, description,
                scheduled_at, price, estimated_cost, estimated_duration_hours,
                status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&job.client_name)
        .bind(&job.phone)
        .bind(&job.address)
        .bind(&job.service_type)
        .bind(job.service_id)
        .bind(&job.description)
        .bind(fmt_naive(job.scheduled_at))
        .bind(job.price.map(|d| d.to_string()))
        .bind(job.estimated_cost.map(|d| d.to_string()))
        .bind(job.estimated_duration_hours.map(|d| d.to_string()))
        .bind(job.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        Self::write_job_children(&mut tx, id, &[], &[], &job.services).await?;
        tx.commit().await.map_err(db_err)?;

        self.get_job(id).await
    }

    async fn update_job(&self, job: &Job) -> Result<Job, RepositoryError> {
        let now = fmt_utc(Utc::now());
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "UPDATE jobs SET
                client_name = ?, phone = ?, address = ?, service_type = ?, service_id = ?,
                description = ?, scheduled_at = ?, price = ?, estimated_cost = ?,
                estimated_duration_hours = ?, status = ?, completed_at = ?, paid_at = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&job.client_name)
        .bind(&job.phone)
        .bind(&job.address)
        .bind(&job.service_type)
        .bind(job.service_id)
        .bind(&job.description)
        .bind(fmt_naive(job.scheduled_at))
        .bind(job.price.map(|d| d.to_string()))
        .bind(job.estimated_cost.map(|d| d.to_string()))
        .bind(job.estimated_duration_hours.map(|d| d.to_string()))
        .bind(job.status.as_str())
        .bind(fmt_opt_utc(job.completed_at))
        .bind(fmt_opt_utc(job.paid_at))
        .bind(&now)
        .bind(job.id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Self::write_job_children(&mut tx, job.id, &job.notes, &job.photos, &job.services).await?;
        tx.commit().await.map_err(db_err)?;

        self.get_job(job.id).await
    }

    async fn delete_job(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        Self::write_job_children(&mut tx, id, &[], &[], &[]).await?;

        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await.map_err(db_err)
    }

    // ── service catalog ──────────────────────────────────────────────────

    async fn list_services(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows: Vec<ServiceRow> = sqlx::query_as(
            "SELECT id, name, category, description, pricing_type, hourly_rate,
                    flat_rate, estimated_duration_hours, is_active
             FROM services ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_service(&self, id: i64) -> Result<Service, RepositoryError> {
        let row: ServiceRow = sqlx::query_as(
            "SELECT id, name, category, description, pricing_type, hourly_rate,
                    flat_rate, estimated_duration_hours, is_active
             FROM services WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn create_service(&self, service: NewService) -> Result<Service, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO services (name, category, description, pricing_type,
                hourly_rate, flat_rate, estimated_duration_hours, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&service.name)
        .bind(service.category.as_str())
        .bind(&service.description)
        .bind(service.pricing.as_str())
        .bind(service.hourly_rate.map(|d| d.to_string()))
        .bind(service.flat_rate.map(|d| d.to_string()))
        .bind(service.estimated_duration_hours.to_string())
        .bind(service.is_active)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_service(result.last_insert_rowid()).await
    }

    async fn update_service(&self, service: &Service) -> Result<Service, RepositoryError> {
        let result = sqlx::query(
            "UPDATE services SET name = ?, category = ?, description = ?, pricing_type = ?,
                hourly_rate = ?, flat_rate = ?, estimated_duration_hours = ?, is_active = ?
             WHERE id = ?",
        )
        .bind(&service.name)
        .bind(service.category.as_str())
        .bind(&service.description)
        .bind(service.pricing.as_str())
        .bind(service.hourly_rate.map(|d| d.to_string()))
        .bind(service.flat_rate.map(|d| d.to_string()))
        .bind(service.estimated_duration_hours.to_string())
        .bind(service.is_active)
        .bind(service.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_service(service.id).await
    }

    async fn delete_service(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // ── clients ──────────────────────────────────────────────────────────

    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT id, name, email, phone, address, status, total_jobs, total_spent,
                    client_since, last_contact
             FROM clients ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_client(&self, id: i64) -> Result<Client, RepositoryError> {
        let row: ClientRow = sqlx::query_as(
            "SELECT id, name, email, phone, address, status, total_jobs, total_spent,
                    client_since, last_contact
             FROM clients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn create_client(&self, client: NewClient) -> Result<Client, RepositoryError> {
        let now = fmt_utc(Utc::now());
        let result = sqlx::query(
            "INSERT INTO clients (name, email, phone, address, status, total_jobs,
                total_spent, client_since, last_contact)
             VALUES (?, ?, ?, ?, ?, 0, '0', ?, ?)",
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_client(result.last_insert_rowid()).await
    }

    async fn update_client(&self, client: &Client) -> Result<Client, RepositoryError> {
        let result = sqlx::query(
            "UPDATE clients SET name = ?, email = ?, phone = ?, address = ?, status = ?,
                total_jobs = ?, total_spent = ?, last_contact = ?
             WHERE id = ?",
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.status.as_str())
        .bind(client.total_jobs as i64)
        .bind(client.total_spent.to_string())
        .bind(fmt_utc(client.last_contact))
        .bind(client.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_client(client.id).await
    }

    async fn delete_client(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Communications belong to the client; remove them with it.
        sqlx::query("DELETE FROM communications WHERE client_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await.map_err(db_err)
    }

    // ── communications ───────────────────────────────────────────────────

    async fn list_communications(
        &self,
        client_id: i64,
    ) -> Result<Vec<Communication>, RepositoryError> {
        let rows: Vec<CommunicationRow> = sqlx::query_as(
            "SELECT id, client_id, kind, subject, message, direction, date
             FROM communications WHERE client_id = ? ORDER BY date DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn create_communication(
        &self,
        communication: NewCommunication,
    ) -> Result<Communication, RepositoryError> {
        let now = fmt_utc(Utc::now());
        let result = sqlx::query(
            "INSERT INTO communications (client_id, kind, subject, message, direction, date)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(communication.client_id)
        .bind(&communication.kind)
        .bind(&communication.subject)
        .bind(&communication.message)
        .bind(communication.direction.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        let row: CommunicationRow = sqlx::query_as(
            "SELECT id, client_id, kind, subject, message, direction, date
             FROM communications WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.try_into()
    }
}
