//! Content repository — published-article metadata in the `contents`
//! table. Rows are write-once for the pipeline.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};

/// A raw content row from the database.
#[derive(Debug, Clone)]
pub struct ContentRow {
    pub id: String,
    pub user_id: String,
    pub emoji: String,
    pub link: String,
    pub title: String,
    pub sub_heading: String,
    pub article_id: String,
    pub created_at: String,
}

impl ContentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            emoji: row.get("emoji")?,
            link: row.get("link")?,
            title: row.get("title")?,
            sub_heading: row.get("sub_heading")?,
            article_id: row.get("article_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Inserts a new content row.
pub fn insert(db: &Database, content: &ContentRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO contents (id, user_id, emoji, link, title, sub_heading, article_id,
             created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                content.id,
                content.user_id,
                content.emoji,
                content.link,
                content.title,
                content.sub_heading,
                content.article_id,
                content.created_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a content record by the external article id.
pub fn find_by_article_id(
    db: &Database,
    article_id: &str,
) -> Result<Option<ContentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM contents WHERE article_id = ?1",
                params![article_id],
                ContentRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Lists content records owned by a user, newest first.
pub fn list_by_user(db: &Database, user_id: &str) -> Result<Vec<ContentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM contents WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows: Vec<ContentRow> = stmt
            .query_map(params![user_id], ContentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
