//! Hand-off of uploaded PDFs to the ingestion worker

mod job_queue;

pub use job_queue::{FileReadyPayload, IngestionQueue, JobStatus, QueuedJob, FILE_READY_JOB};
