pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod generate;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod queue;

pub use config::{load_config, AppConfig, ConfigError};
pub use dispatch::{DispatchError, JobAccepted, JobDispatcher};
pub use error::{DraftmillError, Result};
pub use pipeline::{ArticleRequest, PipelineOutcome, PipelineRunner, Stage};
pub use publish::slugify;
pub use queue::{Job, QueueBatchUpdate, QueueError, QueueStatus, QueueStore};
