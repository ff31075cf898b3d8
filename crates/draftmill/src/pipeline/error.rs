use thiserror::Error;

use crate::generate::GenerationError;
use crate::publish::PublishError;
use crate::queue::QueueError;

/// Errors raised while executing a single pipeline stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The generation collaborator failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The publishing collaborator failed or rejected the post.
    #[error("Publishing failed: {0}")]
    Publish(#[from] PublishError),

    /// The owning user could not be resolved during publish.
    #[error("User with id '{0}' not found")]
    UserNotFound(String),

    /// The stage logic completed but the queue write failed — a
    /// consistency fault, not a business failure.
    #[error("Queue update failed: {0}")]
    QueueUpdate(#[from] QueueError),

    /// A database read outside the queue store failed.
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

/// Structured context handed to the failure handler: everything needed
/// to mark the failed stage's subqueue, without reaching back into the
/// original event envelope.
#[derive(Debug)]
pub struct StageFailure {
    pub job_id: String,
    pub user_id: String,
    pub stage: super::stage::Stage,
    pub error: PipelineError,
}
