use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::service::PricingType;

/// Upper bound for an attached photo, in bytes (5 MiB).
pub const PHOTO_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Job lifecycle. The UI only ever moves a job forward, one step at a time;
/// the field itself is plain data and is not hardened against backward
/// writes (last-write-wins, accepted limitation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Paid,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Paid => "Paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Scheduled" => Some(Self::Scheduled),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// The next forward state, if any. `Paid` is terminal.
    pub fn next(&self) -> Option<JobStatus> {
        match self {
            Self::Scheduled => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => Some(Self::Paid),
            Self::Paid => None,
        }
    }
}

/// Errors raised by job-local operations (notes, photos, pricing).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("note text must not be blank")]
    BlankNote,

    #[error("note {0} not found on this job")]
    NoteNotFound(i64),

    #[error("photo {0} not found on this job")]
    PhotoNotFound(i64),

    #[error("'{name}' is not an image (content type '{content_type}')")]
    NotAnImage { name: String, content_type: String },

    #[error("'{name}' is {size} bytes, over the {limit} byte limit")]
    PhotoTooLarge { name: String, size: u64, limit: u64 },

    #[error("price must not be negative")]
    NegativePrice,

    #[error("job is already {0:?}; no further transitions")]
    AlreadyTerminal(JobStatus),
}

/// A dated note attached to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNote {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Photo metadata attached to a job. The job stores the caller-supplied
/// URL/reference; durable blob storage lives outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPhoto {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// An incoming photo attachment, validated before it is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub name: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// One line of the services manifest captured when an estimate is converted.
/// A snapshot: later catalog edits never change these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobServiceLine {
    pub service_id: i64,
    pub service_name: String,
    pub quantity: u32,
    pub rate: Decimal,
    pub pricing: PricingType,
    pub estimated_duration_hours: Decimal,
}

/// A schedulable unit of work for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub client_name: String,
    pub phone: String,
    pub address: String,
    /// Free text or catalog name; the display fallback when `service_id`
    /// dangles.
    pub service_type: String,
    /// Weak catalog back-reference, lookup only. Deleting the service does
    /// not cascade here.
    pub service_id: Option<i64>,
    pub description: String,
    pub scheduled_at: NaiveDateTime,
    /// None means the price is still "TBD".
    pub price: Option<Decimal>,
    pub estimated_cost: Option<Decimal>,
    pub estimated_duration_hours: Option<Decimal>,
    pub status: JobStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: Vec<JobNote>,
    pub photos: Vec<JobPhoto>,
    pub services: Vec<JobServiceLine>,
}

/// For creating new jobs (no id or timestamps yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub client_name: String,
    pub phone: String,
    pub address: String,
    pub service_type: String,
    pub service_id: Option<i64>,
    pub description: String,
    pub scheduled_at: NaiveDateTime,
    pub price: Option<Decimal>,
    pub estimated_cost: Option<Decimal>,
    pub estimated_duration_hours: Option<Decimal>,
    pub status: JobStatus,
    pub services: Vec<JobServiceLine>,
}

impl Job {
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Advances the job one step along Scheduled → In Progress → Completed
    /// → Paid. `completed_at` is stamped once, on the transition into
    /// Completed; `paid_at` on the transition into Paid. Later transitions
    /// never overwrite an earlier stamp.
    pub fn advance_status(&mut self, now: DateTime<Utc>) -> Result<JobStatus, JobError> {
        let next = self
            .status
            .next()
            .ok_or(JobError::AlreadyTerminal(self.status))?;
        self.status = next;
        match next {
            JobStatus::Completed => {
                if self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
            }
            JobStatus::Paid => {
                if self.paid_at.is_none() {
                    self.paid_at = Some(now);
                }
            }
            _ => {}
        }
        self.touch(now);
        Ok(next)
    }

    /// Sets or clears the committed price. Negative prices are rejected.
    pub fn set_price(
        &mut self,
        price: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<(), JobError> {
        if let Some(p) = price {
            if p < Decimal::ZERO {
                return Err(JobError::NegativePrice);
            }
        }
        self.price = price;
        self.touch(now);
        Ok(())
    }

    fn next_note_id(&self) -> i64 {
        self.notes.iter().map(|n| n.id).max().unwrap_or(0) + 1
    }

    fn next_photo_id(&self) -> i64 {
        self.photos.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    /// Appends a note. Text is trimmed; blank text is rejected and the
    /// notes list is left unchanged.
    pub fn add_note(&mut self, text: &str, now: DateTime<Utc>) -> Result<&JobNote, JobError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(JobError::BlankNote);
        }
        let note = JobNote {
            id: self.next_note_id(),
            text: text.to_string(),
            created_at: now,
            updated_at: None,
        };
        self.notes.push(note);
        self.touch(now);
        Ok(self.notes.last().expect("note was just pushed"))
    }

    pub fn update_note(
        &mut self,
        note_id: i64,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), JobError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(JobError::BlankNote);
        }
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or(JobError::NoteNotFound(note_id))?;
        note.text = text.to_string();
        note.updated_at = Some(now);
        self.touch(now);
        Ok(())
    }

    pub fn delete_note(&mut self, note_id: i64, now: DateTime<Utc>) -> Result<(), JobError> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == note_id)
            .ok_or(JobError::NoteNotFound(note_id))?;
        self.notes.remove(index);
        self.touch(now);
        Ok(())
    }

    /// Validates and attaches a photo. The content type must be `image/*`
    /// and the size at most [`PHOTO_MAX_BYTES`]; rejected uploads leave the
    /// photo list unchanged.
    pub fn add_photo(
        &mut self,
        upload: PhotoUpload,
        now: DateTime<Utc>,
    ) -> Result<&JobPhoto, JobError> {
        if !upload.content_type.starts_with("image/") {
            return Err(JobError::NotAnImage {
                name: upload.name,
                content_type: upload.content_type,
            });
        }
        if upload.size_bytes > PHOTO_MAX_BYTES {
            return Err(JobError::PhotoTooLarge {
                name: upload.name,
                size: upload.size_bytes,
                limit: PHOTO_MAX_BYTES,
            });
        }
        let photo = JobPhoto {
            id: self.next_photo_id(),
            name: upload.name,
            url: upload.url,
            size_bytes: upload.size_bytes,
            content_type: upload.content_type,
            created_at: now,
        };
        self.photos.push(photo);
        self.touch(now);
        Ok(self.photos.last().expect("photo was just pushed"))
    }

    pub fn delete_photo(&mut self, photo_id: i64, now: DateTime<Utc>) -> Result<(), JobError> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or(JobError::PhotoNotFound(photo_id))?;
        self.photos.remove(index);
        self.touch(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    fn test_job() -> Job {
        Job {
            id: 1,
            client_name: "Dana Whitfield".to_string(),
            phone: "555-0134".to_string(),
            address: "18 Alder Ct".to_string(),
            service_type: "Drywall".to_string(),
            service_id: Some(4),
            description: "Patch two wall sections".to_string(),
            scheduled_at: chrono::NaiveDate::from_ymd_opt(2025, 6, 16)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            price: None,
            estimated_cost: Some(dec!(270)),
            estimated_duration_hours: Some(dec!(6)),
            status: JobStatus::Scheduled,
            completed_at: None,
            paid_at: None,
            created_at: ts(0),
            updated_at: ts(0),
            notes: Vec::new(),
            photos: Vec::new(),
            services: Vec::new(),
        }
    }

    fn png_upload(size_bytes: u64) -> PhotoUpload {
        PhotoUpload {
            name: "before.png".to_string(),
            url: "photos/before.png".to_string(),
            size_bytes,
            content_type: "image/png".to_string(),
        }
    }

    // =========================================================================
    // status transitions
    // =========================================================================

    #[test]
    fn status_advances_through_full_lifecycle() {
        let mut job = test_job();

        assert_eq!(job.advance_status(ts(1)), Ok(JobStatus::InProgress));
        assert_eq!(job.advance_status(ts(2)), Ok(JobStatus::Completed));
        assert_eq!(job.advance_status(ts(3)), Ok(JobStatus::Paid));
        assert_eq!(
            job.advance_status(ts(4)),
            Err(JobError::AlreadyTerminal(JobStatus::Paid))
        );
    }

    #[test]
    fn completed_at_is_stamped_once_and_survives_paid_transition() {
        let mut job = test_job();
        job.advance_status(ts(1)).unwrap();
        job.advance_status(ts(2)).unwrap();

        assert_eq!(job.completed_at, Some(ts(2)));

        job.advance_status(ts(3)).unwrap();

        assert_eq!(job.completed_at, Some(ts(2)));
        assert_eq!(job.paid_at, Some(ts(3)));
    }

    #[test]
    fn advance_stamps_updated_at() {
        let mut job = test_job();
        job.advance_status(ts(5)).unwrap();
        assert_eq!(job.updated_at, ts(5));
    }

    #[test]
    fn status_parse_round_trips() {
        for status in [
            JobStatus::Scheduled,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Paid,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("Cancelled"), None);
    }

    // =========================================================================
    // price
    // =========================================================================

    #[test]
    fn set_price_rejects_negative() {
        let mut job = test_job();
        assert_eq!(
            job.set_price(Some(dec!(-1)), ts(1)),
            Err(JobError::NegativePrice)
        );
        assert_eq!(job.price, None);
    }

    #[test]
    fn set_price_accepts_zero_and_clears() {
        let mut job = test_job();
        job.set_price(Some(Decimal::ZERO), ts(1)).unwrap();
        assert_eq!(job.price, Some(Decimal::ZERO));
        job.set_price(None, ts(2)).unwrap();
        assert_eq!(job.price, None);
    }

    // =========================================================================
    // notes
    // =========================================================================

    #[test]
    fn add_note_trims_and_assigns_sequential_ids() {
        let mut job = test_job();

        let first = job.add_note("  Called ahead  ", ts(1)).unwrap().id;
        let second = job.add_note("Gate code 4411", ts(2)).unwrap().id;

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(job.notes[0].text, "Called ahead");
    }

    #[test]
    fn add_blank_note_is_rejected_and_list_unchanged() {
        let mut job = test_job();

        let result = job.add_note("  ", ts(1));

        assert_eq!(result, Err(JobError::BlankNote));
        assert_eq!(job.notes.len(), 0);
    }

    #[test]
    fn note_ids_stay_unique_after_deletes() {
        let mut job = test_job();
        job.add_note("one", ts(1)).unwrap();
        job.add_note("two", ts(2)).unwrap();
        job.delete_note(1, ts(3)).unwrap();

        let id = job.add_note("three", ts(4)).unwrap().id;

        assert_eq!(id, 3);
    }

    #[test]
    fn update_note_sets_updated_at() {
        let mut job = test_job();
        job.add_note("draft", ts(1)).unwrap();

        job.update_note(1, "final", ts(2)).unwrap();

        assert_eq!(job.notes[0].text, "final");
        assert_eq!(job.notes[0].updated_at, Some(ts(2)));
    }

    #[test]
    fn update_missing_note_fails() {
        let mut job = test_job();
        assert_eq!(
            job.update_note(9, "text", ts(1)),
            Err(JobError::NoteNotFound(9))
        );
    }

    #[test]
    fn delete_missing_note_fails() {
        let mut job = test_job();
        assert_eq!(job.delete_note(9, ts(1)), Err(JobError::NoteNotFound(9)));
    }

    // =========================================================================
    // photos
    // =========================================================================

    #[test]
    fn photo_within_limit_is_accepted() {
        let mut job = test_job();

        let photo = job.add_photo(png_upload(4_000_000), ts(1)).unwrap();

        assert_eq!(photo.id, 1);
        assert_eq!(photo.content_type, "image/png");
    }

    #[test]
    fn oversized_photo_is_rejected() {
        let mut job = test_job();

        let result = job.add_photo(png_upload(6_000_000), ts(1));

        assert!(matches!(result, Err(JobError::PhotoTooLarge { .. })));
        assert_eq!(job.photos.len(), 0);
    }

    #[test]
    fn non_image_upload_is_rejected() {
        let mut job = test_job();
        let upload = PhotoUpload {
            name: "invoice.pdf".to_string(),
            url: "docs/invoice.pdf".to_string(),
            size_bytes: 1_000,
            content_type: "application/pdf".to_string(),
        };

        let result = job.add_photo(upload, ts(1));

        assert!(matches!(result, Err(JobError::NotAnImage { .. })));
    }

    #[test]
    fn photo_at_exact_limit_is_accepted() {
        let mut job = test_job();
        assert!(job.add_photo(png_upload(PHOTO_MAX_BYTES), ts(1)).is_ok());
    }

    #[test]
    fn delete_missing_photo_fails() {
        let mut job = test_job();
        assert_eq!(job.delete_photo(3, ts(1)), Err(JobError::PhotoNotFound(3)));
    }
}
