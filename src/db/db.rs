use super::migrations::init_with_migrations;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DB_FILE_NAME: &str = "simpletask.db";

/// Errors raised by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("task {0} does not exist")]
    TaskNotFound(i64),
    #[error("migration {version} failed: {reason}")]
    Migration { version: u32, reason: String },
}

pub type DbResult<T> = Result<T, DbError>;

/// Long-lived handle to the SQLite file.
///
/// Cloning shares the same connection. Every repository call holds the lock
/// for the duration of its statement or transaction, so operations never
/// interleave on the connection.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Db {
    /// Opens (creating if needed) the database at `path` and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Db> {
        let path = path.as_ref().to_path_buf();
        let mut conn = Self::new_without_migrations(&path)?;
        init_with_migrations(&mut conn)?;

        Ok(Db {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Opens a raw connection without touching the schema.
    pub fn new_without_migrations(path: impl AsRef<Path>) -> DbResult<Connection> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}
