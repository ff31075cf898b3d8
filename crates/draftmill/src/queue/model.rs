//! Typed queue data model over the raw database rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::queue_repo::{JobRow, SubqueueRow};

use super::error::QueueError;

/// Status of a job or a subqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Completed,
    Failed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Completed => "completed",
            QueueStatus::Failed => "failed",
        }
    }

    /// Parses a stored status column. Unknown text is an error, never a
    /// silent default.
    pub fn parse(s: &str) -> Result<Self, QueueError> {
        match s {
            "pending" => Ok(QueueStatus::Pending),
            "completed" => Ok(QueueStatus::Completed),
            "failed" => Ok(QueueStatus::Failed),
            other => Err(QueueError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage's progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subqueue {
    pub id: String,
    pub job_id: String,
    pub identifier: String,
    pub status: QueueStatus,
    pub message: String,
}

impl Subqueue {
    pub(crate) fn from_row(row: SubqueueRow) -> Result<Self, QueueError> {
        Ok(Self {
            status: QueueStatus::parse(&row.status)?,
            id: row.id,
            job_id: row.job_id,
            identifier: row.identifier,
            message: row.message,
        })
    }
}

/// One end-to-end pipeline run together with its ordered subqueues.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub user_id: String,
    pub status: QueueStatus,
    pub title: String,
    pub subtitle: String,
    pub keywords: String,
    /// Persisted state-machine marker; `None` before the first stage
    /// records progress.
    pub current_stage: Option<String>,
    /// Cover-image URL produced by the first stage, once available.
    pub cover_image_url: Option<String>,
    /// Article body produced by the content stage, once available.
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub subqueues: Vec<Subqueue>,
}

impl Job {
    pub(crate) fn from_rows(row: JobRow, subqueues: Vec<SubqueueRow>) -> Result<Self, QueueError> {
        let subqueues = subqueues
            .into_iter()
            .map(Subqueue::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            status: QueueStatus::parse(&row.status)?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            subtitle: row.subtitle,
            keywords: row.keywords,
            current_stage: row.current_stage,
            cover_image_url: row.cover_image_url,
            content: row.content,
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            subqueues,
        })
    }

    /// Looks up a subqueue by its stable identifier.
    pub fn subqueue(&self, identifier: &str) -> Option<&Subqueue> {
        self.subqueues.iter().find(|s| s.identifier == identifier)
    }
}

/// Fields required to seed a new job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub subtitle: String,
    pub keywords: String,
}

/// One targeted subqueue transition in a batch update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubqueueUpdate {
    pub identifier: String,
    pub status: QueueStatus,
    pub message: String,
}

/// Batch update payload accepted from non-pipeline callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBatchUpdate {
    pub job_id: String,
    pub user_id: String,
    pub status: QueueStatus,
    #[serde(default)]
    pub subqueues: Vec<SubqueueUpdate>,
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::warn!("parse_timestamp: failed to parse '{}': {}", s, e);
            Utc::now()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            QueueStatus::Pending,
            QueueStatus::Completed,
            QueueStatus::Failed,
        ] {
            assert_eq!(QueueStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        let err = QueueStatus::parse("processing").unwrap_err();
        assert!(matches!(err, QueueError::UnknownStatus(_)));
    }

    #[test]
    fn test_batch_update_deserializes_without_subqueues() {
        let payload: QueueBatchUpdate = serde_json::from_str(
            r#"{"jobId": "j1", "userId": "u1", "status": "completed"}"#,
        )
        .unwrap();
        assert_eq!(payload.job_id, "j1");
        assert_eq!(payload.status, QueueStatus::Completed);
        assert!(payload.subqueues.is_empty());
    }

    #[test]
    fn test_job_subqueue_lookup_by_identifier() {
        let job = Job {
            id: "j1".to_string(),
            user_id: "u1".to_string(),
            status: QueueStatus::Pending,
            title: "T".to_string(),
            subtitle: "S".to_string(),
            keywords: "k".to_string(),
            current_stage: None,
            cover_image_url: None,
            content: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            subqueues: vec![Subqueue {
                id: "s1".to_string(),
                job_id: "j1".to_string(),
                identifier: "cover-image".to_string(),
                status: QueueStatus::Pending,
                message: String::new(),
            }],
        };

        assert!(job.subqueue("cover-image").is_some());
        assert!(job.subqueue("article-content").is_none());
    }
}
