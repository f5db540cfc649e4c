use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::schema;

/// Handle on the relational store. Cheap to clone; every call opens its own
/// connection, so handles can be shared freely across connection tasks.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl Database {
    /// Opens (creating if needed) the store file and applies the schema.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let db = Self {
            path: Arc::new(path.as_ref().to_path_buf()),
            busy_timeout,
        };

        let conn = db.connect()?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        schema::migrate(&conn)?;

        info!("Database ready at {} (journal_mode={})", db.path.display(), mode);
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> Result<Connection, DatabaseError> {
        let conn = Connection::open(self.path.as_path())?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Runs a single-statement style operation on a fresh connection.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    /// Runs `f` inside one transaction.
    ///
    /// The write lock is taken when the transaction begins. The transaction
    /// commits only when `f` returns `Ok`; an `Err` (or a panic) drops it, which
    /// rolls everything back.
    pub fn unit_of_work<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<DatabaseError>,
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DatabaseError::from)?;

        match f(&tx) {
            Ok(value) => {
                tx.commit().map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(e) => {
                debug!("Unit of work failed, rolling back");
                Err(e)
            }
        }
    }
}
