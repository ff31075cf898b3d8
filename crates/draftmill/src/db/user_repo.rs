//! User repository — publishing credentials and generation preferences
//! for the `users` table.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};

/// A raw user row from the database.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub user_id: String,
    pub email: Option<String>,
    pub hashnode_token: Option<String>,
    pub hashnode_pub_id: Option<String>,
    pub gpt_style: Option<String>,
    pub default_author_name: Option<String>,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            user_id: row.get("user_id")?,
            email: row.get("email")?,
            hashnode_token: row.get("hashnode_token")?,
            hashnode_pub_id: row.get("hashnode_pub_id")?,
            gpt_style: row.get("gpt_style")?,
            default_author_name: row.get("default_author_name")?,
        })
    }
}

/// Inserts a new user row.
pub fn insert(db: &Database, user: &UserRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO users (user_id, email, hashnode_token, hashnode_pub_id, gpt_style,
             default_author_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.user_id,
                user.email,
                user.hashnode_token,
                user.hashnode_pub_id,
                user.gpt_style,
                user.default_author_name,
            ],
        )?;
        Ok(())
    })
}

/// Finds a user by id.
pub fn find_by_user_id(db: &Database, user_id: &str) -> Result<Option<UserRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM users WHERE user_id = ?1",
                params![user_id],
                UserRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_user(user_id: &str) -> UserRow {
        UserRow {
            user_id: user_id.to_string(),
            email: Some("writer@example.com".to_string()),
            hashnode_token: Some("hn-token".to_string()),
            hashnode_pub_id: Some("pub-1".to_string()),
            gpt_style: Some("casual".to_string()),
            default_author_name: Some("Ada".to_string()),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        insert(&db, &sample_user("user-1")).unwrap();

        let found = find_by_user_id(&db, "user-1").unwrap().unwrap();
        assert_eq!(found.hashnode_token.as_deref(), Some("hn-token"));
        assert_eq!(found.hashnode_pub_id.as_deref(), Some("pub-1"));
        assert_eq!(found.gpt_style.as_deref(), Some("casual"));
    }

    #[test]
    fn test_find_nonexistent() {
        let db = test_db();
        assert!(find_by_user_id(&db, "nobody").unwrap().is_none());
    }
}
