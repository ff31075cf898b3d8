use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftmillError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::queue::QueueError),

    #[error("Generation error: {0}")]
    Generation(#[from] crate::generate::GenerationError),

    #[error("Publish error: {0}")]
    Publish(#[from] crate::publish::PublishError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] crate::dispatch::DispatchError),
}

pub type Result<T> = std::result::Result<T, DraftmillError>;
