use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the storage layer.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure while preparing the database location.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration {version} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// A thread panicked while holding the connection mutex.
    #[error("Database lock poisoned")]
    LockPoisoned,
}
