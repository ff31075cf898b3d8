//! The pipeline state machine.
//!
//! Each stage follows the same protocol: optional pre-work delay,
//! invoke the collaborator, mark the stage's subqueue `completed`,
//! persist the stage output and advance the state marker, then move to
//! the next stage. On any error the compensating handler marks only
//! that stage's subqueue `failed`; sibling subqueues and the parent job
//! record are never touched. The `current_stage` marker lets
//! [`PipelineRunner::resume`] continue an interrupted job after a
//! restart.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::db::content_repo::{self, ContentRow};
use crate::db::{user_repo, Database};
use crate::generate::{ContentGenerator, ContentSpec, CoverImageSpec, ImageGenerator};
use crate::publish::{slugify, PostDraft, PublishCredentials, PublishError, Publisher};
use crate::queue::{QueueError, QueueStatus, QueueStore, StageProgress};

use super::error::{PipelineError, StageFailure};
use super::input::{ArticleRequest, ContentInput, CoverImageInput, PublishInput};
use super::stage::Stage;

/// Display emoji attached to every published-article record.
const DEFAULT_EMOJI: &str = "🚀";

/// Platform tag applied to published posts when no tags are configured.
const DEFAULT_TAG_ID: &str = "567ae5a72b926c3063c3061a";

/// Pre-work delay before each stage. A scheduling hint, not a
/// correctness requirement.
const DEFAULT_STAGE_DELAY: Duration = Duration::from_secs(1);

/// Outputs a stage may produce for the stages after it.
#[derive(Debug, Default)]
struct StageOutput {
    cover_image_url: Option<String>,
    content: Option<String>,
}

/// Result of driving a job through the pipeline.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub job_id: String,
    pub completed: bool,
    pub failed_stage: Option<Stage>,
}

pub struct PipelineRunner {
    store: QueueStore,
    db: Database,
    image: Arc<dyn ImageGenerator>,
    content: Arc<dyn ContentGenerator>,
    publisher: Arc<dyn Publisher>,
    stage_delay: Duration,
    tag_ids: Vec<String>,
}

impl PipelineRunner {
    pub fn new(
        store: QueueStore,
        db: Database,
        image: Arc<dyn ImageGenerator>,
        content: Arc<dyn ContentGenerator>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            store,
            db,
            image,
            content,
            publisher,
            stage_delay: DEFAULT_STAGE_DELAY,
            tag_ids: vec![DEFAULT_TAG_ID.to_string()],
        }
    }

    /// Overrides the pre-work delay. Tests pass `Duration::ZERO`.
    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    /// Overrides the platform tags applied to published posts.
    pub fn with_tag_ids(mut self, tag_ids: Vec<String>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Runs the full pipeline for a fresh job, starting at the
    /// cover-image stage.
    pub async fn run(&self, request: ArticleRequest) -> PipelineOutcome {
        self.drive(request, Stage::CoverImage, None, None).await
    }

    /// Resumes an interrupted job at its recorded stage, rebuilding the
    /// forwarded inputs from persisted outputs. Falls back to an
    /// earlier stage when a recorded stage's prerequisite output is
    /// missing.
    pub async fn resume(
        &self,
        job_id: &str,
        user_id: &str,
    ) -> Result<PipelineOutcome, QueueError> {
        let job = self.store.find_job(job_id, user_id)?;

        if job.status == QueueStatus::Completed {
            debug!("Job {} already completed, nothing to resume", job_id);
            return Ok(PipelineOutcome {
                job_id: job.id,
                completed: true,
                failed_stage: None,
            });
        }

        let request = ArticleRequest {
            job_id: job.id.clone(),
            user_id: job.user_id.clone(),
            title: job.title.clone(),
            subtitle: job.subtitle.clone(),
            keywords: job.keywords.clone(),
        };

        let recorded = job
            .current_stage
            .as_deref()
            .and_then(Stage::parse)
            .unwrap_or(Stage::CoverImage);

        let stage = match recorded {
            Stage::ArticleContent if job.cover_image_url.is_none() => {
                warn!(
                    "Job {} recorded at {} without a cover image, restarting earlier",
                    job_id, recorded
                );
                Stage::CoverImage
            }
            Stage::Publish if job.cover_image_url.is_none() => {
                warn!(
                    "Job {} recorded at {} without a cover image, restarting earlier",
                    job_id, recorded
                );
                Stage::CoverImage
            }
            Stage::Publish if job.content.is_none() => {
                warn!(
                    "Job {} recorded at {} without article content, restarting earlier",
                    job_id, recorded
                );
                Stage::ArticleContent
            }
            stage => stage,
        };

        Ok(self
            .drive(request, stage, job.cover_image_url, job.content)
            .await)
    }

    /// The driver loop: executes stages in order until the pipeline
    /// completes or a stage fails.
    async fn drive(
        &self,
        request: ArticleRequest,
        start: Stage,
        mut cover_image_url: Option<String>,
        mut content: Option<String>,
    ) -> PipelineOutcome {
        let mut stage = start;

        loop {
            let span = info_span!("stage",
                job_id = %request.job_id,
                stage = stage.identifier(),
            );

            if self.stage_delay > Duration::ZERO {
                tokio::time::sleep(self.stage_delay).await;
            }

            let result = self
                .execute_stage(stage, &request, cover_image_url.as_deref(), content.as_deref())
                .instrument(span)
                .await;

            match result {
                Ok(output) => {
                    if let Some(url) = output.cover_image_url {
                        cover_image_url = Some(url);
                    }
                    if let Some(body) = output.content {
                        content = Some(body);
                    }
                    match stage.next() {
                        Some(next) => stage = next,
                        None => {
                            info!("Job {} completed", request.job_id);
                            return PipelineOutcome {
                                job_id: request.job_id,
                                completed: true,
                                failed_stage: None,
                            };
                        }
                    }
                }
                Err(err) => {
                    self.handle_stage_failure(&StageFailure {
                        job_id: request.job_id.clone(),
                        user_id: request.user_id.clone(),
                        stage,
                        error: err,
                    });
                    return PipelineOutcome {
                        job_id: request.job_id,
                        completed: false,
                        failed_stage: Some(stage),
                    };
                }
            }
        }
    }

    async fn execute_stage(
        &self,
        stage: Stage,
        request: &ArticleRequest,
        cover_image_url: Option<&str>,
        content: Option<&str>,
    ) -> Result<StageOutput, PipelineError> {
        match stage {
            Stage::CoverImage => {
                self.run_cover_image(&CoverImageInput::from(request)).await
            }
            Stage::ArticleContent => {
                let input = ContentInput {
                    job_id: request.job_id.clone(),
                    user_id: request.user_id.clone(),
                    title: request.title.clone(),
                    subtitle: request.subtitle.clone(),
                    cover_image_url: cover_image_url.unwrap_or_default().to_string(),
                };
                self.run_article_content(&input).await
            }
            Stage::Publish => {
                let input = PublishInput {
                    job_id: request.job_id.clone(),
                    user_id: request.user_id.clone(),
                    title: request.title.clone(),
                    subtitle: request.subtitle.clone(),
                    cover_image_url: cover_image_url.unwrap_or_default().to_string(),
                    content: content.unwrap_or_default().to_string(),
                };
                self.run_publish(&input).await
            }
        }
    }

    async fn run_cover_image(
        &self,
        input: &CoverImageInput,
    ) -> Result<StageOutput, PipelineError> {
        let image = self
            .image
            .generate(&CoverImageSpec {
                subtitle: input.subtitle.clone(),
                keywords: input.keywords.clone(),
            })
            .await?;

        self.store.update_subqueue(
            &input.job_id,
            &input.user_id,
            Stage::CoverImage.identifier(),
            QueueStatus::Completed,
            Stage::CoverImage.success_message(),
        )?;
        self.store.record_stage_progress(
            &input.job_id,
            &input.user_id,
            &StageProgress {
                current_stage: Some(Stage::ArticleContent.identifier().to_string()),
                cover_image_url: Some(image.url.clone()),
                content: None,
            },
        )?;

        debug!("Cover image generated for job {}", input.job_id);
        Ok(StageOutput {
            cover_image_url: Some(image.url),
            content: None,
        })
    }

    async fn run_article_content(
        &self,
        input: &ContentInput,
    ) -> Result<StageOutput, PipelineError> {
        // Preferences are optional: a user without stored settings gets
        // the backend defaults.
        let preferences = user_repo::find_by_user_id(&self.db, &input.user_id)?;

        let generated = self
            .content
            .generate(&ContentSpec {
                title: input.title.clone(),
                subtitle: input.subtitle.clone(),
                chat_history: String::new(),
                context: String::new(),
                style: preferences.as_ref().and_then(|u| u.gpt_style.clone()),
                author_name: preferences
                    .as_ref()
                    .and_then(|u| u.default_author_name.clone()),
            })
            .await?;

        self.store.update_subqueue(
            &input.job_id,
            &input.user_id,
            Stage::ArticleContent.identifier(),
            QueueStatus::Completed,
            Stage::ArticleContent.success_message(),
        )?;
        self.store.record_stage_progress(
            &input.job_id,
            &input.user_id,
            &StageProgress {
                current_stage: Some(Stage::Publish.identifier().to_string()),
                cover_image_url: None,
                content: Some(generated.content.clone()),
            },
        )?;

        debug!("Article content generated for job {}", input.job_id);
        Ok(StageOutput {
            cover_image_url: None,
            content: Some(generated.content),
        })
    }

    async fn run_publish(&self, input: &PublishInput) -> Result<StageOutput, PipelineError> {
        let user = user_repo::find_by_user_id(&self.db, &input.user_id)?
            .ok_or_else(|| PipelineError::UserNotFound(input.user_id.clone()))?;

        let api_key = user
            .hashnode_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PublishError::MissingCredentials(input.user_id.clone()))?;
        let publication_id = user
            .hashnode_pub_id
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PublishError::MissingCredentials(input.user_id.clone()))?;

        let credentials = PublishCredentials {
            api_key: SecretString::from(api_key),
            publication_id,
        };
        let draft = PostDraft {
            title: input.title.clone(),
            subtitle: input.subtitle.clone(),
            content_markdown: input.content.clone(),
            slug: slugify(&input.subtitle),
            cover_image_url: input.cover_image_url.clone(),
            tag_ids: self.tag_ids.clone(),
        };

        let post = self.publisher.create_post(&draft, &credentials).await?;

        // Jobs seeded before the publish subqueue existed only carry
        // the two generation subqueues; tolerate its absence.
        match self.store.update_subqueue(
            &input.job_id,
            &input.user_id,
            Stage::Publish.identifier(),
            QueueStatus::Completed,
            Stage::Publish.success_message(),
        ) {
            Ok(()) => {}
            Err(QueueError::SubqueueNotFound { .. }) => {
                debug!("Job {} has no publish subqueue", input.job_id);
            }
            Err(e) => return Err(e.into()),
        }

        self.store
            .set_job_status(&input.job_id, &input.user_id, QueueStatus::Completed)?;

        // Second half of the publish commit. The job is already
        // completed at this point; a failure here leaves a completed
        // job without its content record, so log both ids for manual
        // recovery.
        let record = ContentRow {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: input.user_id.clone(),
            emoji: DEFAULT_EMOJI.to_string(),
            link: post.url.clone(),
            title: input.title.clone(),
            sub_heading: input.subtitle.clone(),
            article_id: post.id.clone(),
            created_at: Utc::now().to_rfc3339(),
        };
        if let Err(e) = content_repo::insert(&self.db, &record) {
            error!(
                "Job {} is completed but content record for article {} was not stored: {}",
                input.job_id, post.id, e
            );
        }

        info!(
            "Article {} published for job {} at {}",
            post.id, input.job_id, post.url
        );
        Ok(StageOutput::default())
    }

    /// Compensating handler for a failed stage. Marks only the failed
    /// stage's subqueue; store errors here are logged and swallowed
    /// because no further recovery path exists.
    fn handle_stage_failure(&self, failure: &StageFailure) {
        error!(
            "Stage {} failed for job {}: {}",
            failure.stage, failure.job_id, failure.error
        );

        if let Err(e) = self.store.update_subqueue(
            &failure.job_id,
            &failure.user_id,
            failure.stage.identifier(),
            QueueStatus::Failed,
            failure.stage.failure_message(),
        ) {
            warn!(
                "Unable to record failure of stage {} for job {}: {}",
                failure.stage, failure.job_id, e
            );
        }
    }
}
