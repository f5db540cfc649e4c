use rusqlite::ffi;
use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl DatabaseError {
    pub fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        DatabaseError::Corrupt { table, reason: reason.into() }
    }

    /// True for UNIQUE and PRIMARY KEY violations.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => {
                e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            }
            _ => false,
        }
    }

    /// The message SQLite attached to a failure, e.g. `UNIQUE constraint failed: accounts.pid`.
    pub fn detail(&self) -> Option<&str> {
        match self {
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(_, Some(msg))) => Some(msg),
            _ => None,
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(e: DatabaseError) -> Self {
        AppError::Database(e.to_string())
    }
}
