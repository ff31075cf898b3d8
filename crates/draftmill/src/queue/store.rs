//! The queue store — durable job/subqueue state scoped by owner.
//!
//! All mutation goes through targeted read-modify-write statements so an
//! update to one subqueue can never clobber a sibling. The store is an
//! injected capability over a [`Database`] handle; tests use an
//! in-memory database for isolation.

use chrono::Utc;

use crate::db::queue_repo::{self, JobRow, SubqueueRow};
use crate::db::Database;

use super::error::QueueError;
use super::model::{Job, NewJob, QueueBatchUpdate, QueueStatus};

/// Stage outputs and state-machine marker persisted after a stage
/// completes. `None` outputs leave the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct StageProgress {
    pub current_stage: Option<String>,
    pub cover_image_url: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct QueueStore {
    db: Database,
}

impl QueueStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Seeds a new pending job with one pending subqueue per identifier.
    /// Identifiers are stored in the given order.
    pub fn create_job(&self, new_job: &NewJob, identifiers: &[&str]) -> Result<(), QueueError> {
        let now = Utc::now().to_rfc3339();
        queue_repo::insert_job(
            &self.db,
            &JobRow {
                id: new_job.id.clone(),
                user_id: new_job.user_id.clone(),
                status: QueueStatus::Pending.as_str().to_string(),
                title: new_job.title.clone(),
                subtitle: new_job.subtitle.clone(),
                keywords: new_job.keywords.clone(),
                current_stage: None,
                cover_image_url: None,
                content: None,
                created_at: now.clone(),
                updated_at: now,
            },
        )?;

        for identifier in identifiers {
            queue_repo::insert_subqueue(
                &self.db,
                &SubqueueRow {
                    id: uuid::Uuid::new_v4().to_string(),
                    job_id: new_job.id.clone(),
                    identifier: identifier.to_string(),
                    status: QueueStatus::Pending.as_str().to_string(),
                    message: "Queued".to_string(),
                },
            )?;
        }

        Ok(())
    }

    /// Fetches a job together with its full subqueue set, scoped to the
    /// owner. A job owned by someone else is reported as not found.
    pub fn find_job(&self, job_id: &str, user_id: &str) -> Result<Job, QueueError> {
        let row = queue_repo::find_job(&self.db, job_id, user_id)?
            .ok_or_else(|| QueueError::JobNotFound(job_id.to_string()))?;
        let subqueues = queue_repo::list_subqueues(&self.db, job_id)?;
        Job::from_rows(row, subqueues)
    }

    /// Applies a status/message transition to exactly one subqueue,
    /// located by identifier. Siblings and the parent job row are
    /// untouched.
    pub fn update_subqueue(
        &self,
        job_id: &str,
        user_id: &str,
        identifier: &str,
        status: QueueStatus,
        message: &str,
    ) -> Result<(), QueueError> {
        // Resolve the job first so a missing or foreign job aborts
        // before any write.
        self.find_job(job_id, user_id)?;

        let changed =
            queue_repo::update_subqueue(&self.db, job_id, identifier, status.as_str(), message)?;
        if changed == 0 {
            return Err(QueueError::SubqueueNotFound {
                job_id: job_id.to_string(),
                identifier: identifier.to_string(),
            });
        }
        Ok(())
    }

    /// Transitions only the parent job's status field.
    ///
    /// `Completed` is accepted only when every subqueue is itself
    /// completed; the first offending subqueue is named in the error.
    pub fn set_job_status(
        &self,
        job_id: &str,
        user_id: &str,
        status: QueueStatus,
    ) -> Result<(), QueueError> {
        let job = self.find_job(job_id, user_id)?;

        if status == QueueStatus::Completed {
            if let Some(open) = job
                .subqueues
                .iter()
                .find(|s| s.status != QueueStatus::Completed)
            {
                return Err(QueueError::SubqueuesIncomplete {
                    job_id: job_id.to_string(),
                    identifier: open.identifier.clone(),
                    status: open.status.to_string(),
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let changed =
            queue_repo::update_job_status(&self.db, job_id, user_id, status.as_str(), &now)?;
        if changed == 0 {
            return Err(QueueError::JobNotFound(job_id.to_string()));
        }
        Ok(())
    }

    /// Jobs whose parent status is still `pending`, oldest first, each
    /// with its full subqueue set. Restart recovery re-drives these.
    pub fn list_pending_jobs(&self) -> Result<Vec<Job>, QueueError> {
        let rows = queue_repo::list_jobs_by_status(&self.db, QueueStatus::Pending.as_str())?;
        rows.into_iter()
            .map(|row| {
                let subqueues = queue_repo::list_subqueues(&self.db, &row.id)?;
                Job::from_rows(row, subqueues)
            })
            .collect()
    }

    /// Persists the state-machine marker and stage outputs.
    pub fn record_stage_progress(
        &self,
        job_id: &str,
        user_id: &str,
        progress: &StageProgress,
    ) -> Result<(), QueueError> {
        let now = Utc::now().to_rfc3339();
        let changed = queue_repo::update_stage_progress(
            &self.db,
            job_id,
            user_id,
            progress.current_stage.as_deref(),
            progress.cover_image_url.as_deref(),
            progress.content.as_deref(),
            &now,
        )?;
        if changed == 0 {
            return Err(QueueError::JobNotFound(job_id.to_string()));
        }
        Ok(())
    }

    /// Batch update surface for non-pipeline callers: zero or more
    /// subqueue transitions followed by one job-status transition.
    ///
    /// Unlike the pipeline paths this authenticates the owner
    /// explicitly, so a wrong owner is `Unauthorized`, not
    /// `JobNotFound`. All identifiers are validated before the first
    /// write.
    pub fn update_queue_batch(&self, update: &QueueBatchUpdate) -> Result<(), QueueError> {
        let row = queue_repo::find_job_unscoped(&self.db, &update.job_id)?
            .ok_or_else(|| QueueError::JobNotFound(update.job_id.clone()))?;

        if row.user_id != update.user_id {
            return Err(QueueError::Unauthorized {
                job_id: update.job_id.clone(),
                user_id: update.user_id.clone(),
            });
        }

        let existing = queue_repo::list_subqueues(&self.db, &update.job_id)?;
        for subqueue in &update.subqueues {
            if !existing.iter().any(|s| s.identifier == subqueue.identifier) {
                return Err(QueueError::SubqueueNotFound {
                    job_id: update.job_id.clone(),
                    identifier: subqueue.identifier.clone(),
                });
            }
        }

        // The completion invariant is checked against the statuses the
        // batch would leave behind, so a rejected batch leaves no
        // partial state.
        if update.status == QueueStatus::Completed {
            for current in &existing {
                let effective = update
                    .subqueues
                    .iter()
                    .find(|s| s.identifier == current.identifier)
                    .map(|s| s.status.as_str())
                    .unwrap_or(current.status.as_str());
                if effective != QueueStatus::Completed.as_str() {
                    return Err(QueueError::SubqueuesIncomplete {
                        job_id: update.job_id.clone(),
                        identifier: current.identifier.clone(),
                        status: effective.to_string(),
                    });
                }
            }
        }

        for subqueue in &update.subqueues {
            queue_repo::update_subqueue(
                &self.db,
                &update.job_id,
                &subqueue.identifier,
                subqueue.status.as_str(),
                &subqueue.message,
            )?;
        }

        self.set_job_status(&update.job_id, &update.user_id, update.status)
    }
}
