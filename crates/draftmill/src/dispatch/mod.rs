//! Job dispatch: accepts an article request, seeds the durable queue
//! state, and hands the pipeline off to a background task.
//!
//! The caller gets a synchronous acknowledgement once the job row and
//! its subqueues exist; stage execution happens after the ack.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::pipeline::{ArticleRequest, PipelineRunner, Stage};
use crate::queue::{NewJob, QueueError, QueueStore};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// The acknowledgement returned to the caller at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobAccepted {
    pub job_id: String,
}

pub struct JobDispatcher {
    store: QueueStore,
    runner: Arc<PipelineRunner>,
}

impl JobDispatcher {
    pub fn new(store: QueueStore, runner: Arc<PipelineRunner>) -> Self {
        Self { store, runner }
    }

    /// Validates and enqueues a request, then spawns the pipeline.
    ///
    /// The job row and all stage subqueues are durable before this
    /// returns.
    pub fn submit(&self, request: ArticleRequest) -> Result<JobAccepted, DispatchError> {
        if request.job_id.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "jobId must not be empty".to_string(),
            ));
        }
        if request.user_id.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "userId must not be empty".to_string(),
            ));
        }
        if request.title.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "title must not be empty".to_string(),
            ));
        }
        if request.subtitle.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "subtitle must not be empty".to_string(),
            ));
        }
        self.store.create_job(
            &NewJob {
                id: request.job_id.clone(),
                user_id: request.user_id.clone(),
                title: request.title.clone(),
                subtitle: request.subtitle.clone(),
                keywords: request.keywords.clone(),
            },
            &[
                Stage::CoverImage.identifier(),
                Stage::ArticleContent.identifier(),
                Stage::Publish.identifier(),
            ],
        )?;

        info!("Accepted job {} for user {}", request.job_id, request.user_id);

        let job_id = request.job_id.clone();
        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            let outcome = runner.run(request).await;
            if let Some(stage) = outcome.failed_stage {
                error!("Job {} stopped at stage {}", outcome.job_id, stage);
            }
        });

        Ok(JobAccepted { job_id })
    }

    /// Resumes interrupted jobs after a restart: every job still
    /// `pending` in the store is re-driven from its recorded stage.
    /// Returns how many jobs were picked up.
    pub fn resume_pending(&self) -> Result<usize, DispatchError> {
        let jobs = self.store.list_pending_jobs()?;
        let count = jobs.len();
        if count > 0 {
            info!("Resuming {} pending job(s)", count);
        }
        for job in jobs {
            let runner = Arc::clone(&self.runner);
            tokio::spawn(async move {
                if let Err(e) = runner.resume(&job.id, &job.user_id).await {
                    error!("Unable to resume job {}: {}", job.id, e);
                }
            });
        }
        Ok(count)
    }
}
