use thiserror::Error;

/// Errors from queue store operations.
///
/// A job owned by a different user surfaces as `JobNotFound` so callers
/// cannot probe for the existence of other tenants' jobs. Only the batch
/// update path, which authenticates the owner explicitly, distinguishes
/// `Unauthorized`.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Job with id '{0}' not found")]
    JobNotFound(String),

    #[error("Subqueue '{identifier}' not found for job '{job_id}'")]
    SubqueueNotFound { job_id: String, identifier: String },

    #[error("User '{user_id}' is not the owner of job '{job_id}'")]
    Unauthorized { job_id: String, user_id: String },

    #[error("Job '{job_id}' cannot be completed: subqueue '{identifier}' is {status}")]
    SubqueuesIncomplete {
        job_id: String,
        identifier: String,
        status: String,
    },

    #[error("Unknown queue status '{0}'")]
    UnknownStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}
