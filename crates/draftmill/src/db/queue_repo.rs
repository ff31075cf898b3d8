//! Queue repository — row-level operations for the `jobs` and
//! `subqueues` tables.
//!
//! Every read and write is scoped by (job id, owning user id) so a job
//! belonging to a different user is indistinguishable from a missing one.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub title: String,
    pub subtitle: String,
    pub keywords: String,
    pub current_stage: Option<String>,
    pub cover_image_url: Option<String>,
    pub content: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            status: row.get("status")?,
            title: row.get("title")?,
            subtitle: row.get("subtitle")?,
            keywords: row.get("keywords")?,
            current_stage: row.get("current_stage")?,
            cover_image_url: row.get("cover_image_url")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// A raw subqueue row from the database.
#[derive(Debug, Clone)]
pub struct SubqueueRow {
    pub id: String,
    pub job_id: String,
    pub identifier: String,
    pub status: String,
    pub message: String,
}

impl SubqueueRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            job_id: row.get("job_id")?,
            identifier: row.get("identifier")?,
            status: row.get("status")?,
            message: row.get("message")?,
        })
    }
}

/// Inserts a new job row.
pub fn insert_job(db: &Database, job: &JobRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO jobs (id, user_id, status, title, subtitle, keywords, current_stage,
             cover_image_url, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                job.id,
                job.user_id,
                job.status,
                job.title,
                job.subtitle,
                job.keywords,
                job.current_stage,
                job.cover_image_url,
                job.content,
                job.created_at,
                job.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Inserts a new subqueue row.
pub fn insert_subqueue(db: &Database, subqueue: &SubqueueRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO subqueues (id, job_id, identifier, status, message)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                subqueue.id,
                subqueue.job_id,
                subqueue.identifier,
                subqueue.status,
                subqueue.message,
            ],
        )?;
        Ok(())
    })
}

/// Finds a job by (id, owner). Returns `None` if the id does not exist
/// or the job belongs to a different user.
pub fn find_job(
    db: &Database,
    job_id: &str,
    user_id: &str,
) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM jobs WHERE id = ?1 AND user_id = ?2",
                params![job_id, user_id],
                JobRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Finds a job by id only, without owner scoping. Used by the batch
/// update path, which distinguishes a missing job from a wrong owner.
pub fn find_job_unscoped(db: &Database, job_id: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM jobs WHERE id = ?1",
                params![job_id],
                JobRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Lists jobs with the given status, oldest first. Restart recovery
/// enumerates pending jobs through this.
pub fn list_jobs_by_status(db: &Database, status: &str) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM jobs WHERE status = ?1 ORDER BY created_at")?;
        let rows: Vec<JobRow> = stmt
            .query_map(params![status], JobRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Lists all subqueues of a job in insertion order.
pub fn list_subqueues(db: &Database, job_id: &str) -> Result<Vec<SubqueueRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM subqueues WHERE job_id = ?1 ORDER BY rowid")?;
        let rows: Vec<SubqueueRow> = stmt
            .query_map(params![job_id], SubqueueRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Updates the status and message of exactly one subqueue, located by
/// (job id, identifier). Sibling rows are untouched. Returns the number
/// of rows changed (0 when the identifier is unknown).
pub fn update_subqueue(
    db: &Database,
    job_id: &str,
    identifier: &str,
    status: &str,
    message: &str,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE subqueues SET status = ?3, message = ?4
             WHERE job_id = ?1 AND identifier = ?2",
            params![job_id, identifier, status, message],
        )?;
        Ok(changed)
    })
}

/// Updates only the status and updated_at of a job, scoped by owner.
/// Returns the number of rows changed.
pub fn update_job_status(
    db: &Database,
    job_id: &str,
    user_id: &str,
    status: &str,
    updated_at: &str,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE jobs SET status = ?3, updated_at = ?4 WHERE id = ?1 AND user_id = ?2",
            params![job_id, user_id, status, updated_at],
        )?;
        Ok(changed)
    })
}

/// Persists the state-machine marker and any stage outputs produced so
/// far. Passing `None` for an output leaves the stored value unchanged.
pub fn update_stage_progress(
    db: &Database,
    job_id: &str,
    user_id: &str,
    current_stage: Option<&str>,
    cover_image_url: Option<&str>,
    content: Option<&str>,
    updated_at: &str,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE jobs SET current_stage = ?3,
             cover_image_url = COALESCE(?4, cover_image_url),
             content = COALESCE(?5, content),
             updated_at = ?6
             WHERE id = ?1 AND user_id = ?2",
            params![
                job_id,
                user_id,
                current_stage,
                cover_image_url,
                content,
                updated_at
            ],
        )?;
        Ok(changed)
    })
}
