mod job_form;

pub use job_form::JobFormModel;
