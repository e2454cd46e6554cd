mod client;
mod communication;
mod job;
mod service;

pub use client::{Client, ClientStatus, NewClient};
pub use communication::{CommunicationDirection, Communication, NewCommunication};
pub use job::{
    Job, JobError, JobNote, JobPhoto, JobServiceLine, JobStatus, NewJob, PhotoUpload,
    PHOTO_MAX_BYTES,
};
pub use service::{
    NewService, PricingType, Service, ServiceCategory, ServiceValidationError,
    services_by_category, search_services,
};
